use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use telemcore::processing::{PlotRow, PlotSnapshot, StageHandle};

/// Writes one stage's published rows with a `time,v_x,v_y,velocity_error,altitude_error`
/// header.
pub fn write_snapshot(path: &Path, snapshot: &PlotSnapshot) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    if snapshot.rows.is_empty() {
        writer.write_record(PlotRow::COLUMNS)?;
    }
    for row in &snapshot.rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports every stage's plot buffer as `stage_<n>.csv` under `dir`; returns the paths.
pub fn export_stages(dir: &Path, stages: &[Arc<StageHandle>]) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    stages
        .iter()
        .map(|handle| {
            let path = dir.join(format!("stage_{}.csv", handle.kind().number()));
            write_snapshot(&path, &handle.plot().snapshot())?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemcore::Vector2D;

    #[test]
    fn snapshot_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage.csv");
        let snapshot = PlotSnapshot {
            version: 1,
            rows: vec![PlotRow::new(1.5, Vector2D::new(3.0, 4.0), 0.0, -0.125)],
        };
        write_snapshot(&path, &snapshot).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("time,v_x,v_y,velocity_error,altitude_error")
        );
        assert_eq!(lines.next(), Some("1.5,3.0,4.0,0.0,-0.125"));
    }

    #[test]
    fn empty_snapshot_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_snapshot(&path, &PlotSnapshot::default()).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim_end(),
            "time,v_x,v_y,velocity_error,altitude_error"
        );
    }
}
