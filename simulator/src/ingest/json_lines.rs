use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use telemcore::model::{TelemetryDataset, TelemetryRecord};

/// Loads telemetry written one JSON object per line:
/// `{"time": 12.0, "velocity": 180.5, "altitude": 1.2}`.
pub fn load_json_lines<P: AsRef<Path>>(path: P) -> anyhow::Result<TelemetryDataset> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)
        .with_context(|| format!("telemetry source unavailable: {}", path_ref.display()))?;
    parse_json_lines(BufReader::new(file))
        .with_context(|| format!("loading telemetry from {}", path_ref.display()))
}

/// Parses JSON-lines telemetry. Blank lines are skipped; a later record for an existing time
/// key replaces the earlier one.
pub fn parse_json_lines<R: BufRead>(reader: R) -> anyhow::Result<TelemetryDataset> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading telemetry line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: TelemetryRecord = serde_json::from_str(&line)
            .with_context(|| format!("parsing telemetry line {}", index + 1))?;
        records.push(record);
    }
    let dataset = TelemetryDataset::from_records(records)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn parses_records_and_keeps_last_duplicate() {
        let input = "{\"time\": 1.0, \"velocity\": 10.0, \"altitude\": 0.0}\n\
                     \n\
                     {\"time\": 0.5, \"velocity\": 5.0, \"altitude\": 0.0}\n\
                     {\"time\": 1.0, \"velocity\": 11.0, \"altitude\": 0.1}\n";
        let dataset = parse_json_lines(Cursor::new(input)).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.velocity_at(1.0), Some(11.0));
        assert_eq!(dataset.altitude_at(1.0), Some(0.1));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let input = "{\"time\": 1.0, \"velocity\": 10.0, \"altitude\": 0.0}\n{\"time\": 2.0}\n";
        let err = parse_json_lines(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn empty_source_is_invalid_input() {
        assert!(parse_json_lines(Cursor::new("")).is_err());
    }

    #[test]
    fn negative_velocity_is_rejected() {
        let input = "{\"time\": 1.0, \"velocity\": -5.0, \"altitude\": 0.0}\n";
        let err = parse_json_lines(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn loads_from_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "{{\"time\": 0.1, \"velocity\": 3.0, \"altitude\": 0.0}}").unwrap();
        let dataset = load_json_lines(temp.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let err = load_json_lines("/nonexistent/telemetry.jsonl").unwrap_err();
        assert!(err.to_string().contains("telemetry source unavailable"));
    }
}
