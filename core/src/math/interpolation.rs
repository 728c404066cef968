/// Replaces runs of held (repeated) readings with a linear ramp between the surrounding
/// distinct values.
///
/// A sample whose value equals the last distinct value is treated as a held reading and
/// queued. When the value changes, or the final sample is reached, the queued timestamps are
/// assigned points on the line between the last distinct sample and the current one. The
/// final sample always flushes, so a trailing held run is ramped flat onto its own value.
///
/// Operates in place: only queued (earlier) entries are rewritten, so every read sees the
/// original value. `points` must be ordered by strictly increasing time; an empty slice is
/// left untouched.
pub fn fill_held_runs(points: &mut [(f64, f64)]) {
    let Some(last_index) = points.len().checked_sub(1) else {
        return;
    };

    let mut pending: Vec<usize> = Vec::new();
    let mut last_unique: Option<(f64, f64)> = None;

    for index in 0..points.len() {
        let (t, v) = points[index];
        let changed = last_unique.map_or(true, |(_, last_v)| v != last_v);

        if !changed && index != last_index {
            pending.push(index);
            continue;
        }

        if let Some((last_t, last_v)) = last_unique {
            if !pending.is_empty() {
                let slope = (v - last_v) / (t - last_t);
                for &held in &pending {
                    let held_t = points[held].0;
                    points[held].1 = last_v + slope * (held_t - last_t);
                }
                pending.clear();
            }
        }

        last_unique = Some((t, v));
    }
}
