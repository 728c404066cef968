use crate::math::vector2d::Vector2D;

/// Splits a velocity magnitude into horizontal and vertical components so that the vertical
/// component climbs from `alt_prev` to `alt_next` (km) over `dt` seconds.
///
/// The climb rate is clamped to `v_mag`, so `|v_y| <= v_mag` and the horizontal radicand is
/// floored at zero. A non-positive `dt` treats any altitude change as an unbounded rate, which
/// the clamp turns into a purely vertical vector.
pub fn decompose(v_mag: f64, alt_prev: f64, alt_next: f64, dt: f64) -> Vector2D {
    let dy = (alt_next - alt_prev) * 1000.0;
    let rate = if dt > 0.0 {
        (dy / dt).abs()
    } else if dy == 0.0 {
        0.0
    } else {
        f64::INFINITY
    };
    let v_y = rate.min(v_mag).copysign(dy);
    Vector2D::new(horizontal(v_mag, v_y), v_y)
}

/// Re-derives the horizontal component from an authoritative vertical component.
pub fn rederive_x(v_mag: f64, v_y: f64) -> Vector2D {
    Vector2D::new(horizontal(v_mag, v_y), v_y)
}

fn horizontal(v_mag: f64, v_y: f64) -> f64 {
    (v_mag * v_mag - v_y * v_y).max(0.0).sqrt()
}
