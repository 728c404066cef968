use crate::model::series::TimeSeries;
use crate::prelude::{StageError, StageResult};
use serde::{Deserialize, Serialize};

/// One telemetry reading as delivered by the ingestion side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Seconds since liftoff.
    pub time: f64,
    /// Velocity magnitude, m/s.
    pub velocity: f64,
    /// Altitude, km.
    pub altitude: f64,
}

/// Paired velocity-magnitude and altitude series over one shared time-key domain.
///
/// Created once and read-only afterwards. Construction rejects empty series and series whose
/// key sets differ, so every stage can pair samples by key without guessing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryDataset {
    velocities: TimeSeries,
    altitudes: TimeSeries,
}

impl TelemetryDataset {
    pub fn new(velocities: TimeSeries, altitudes: TimeSeries) -> StageResult<Self> {
        if velocities.is_empty() || altitudes.is_empty() {
            return Err(StageError::InvalidInput("telemetry series are empty".into()));
        }
        if velocities.len() != altitudes.len() {
            return Err(StageError::InvalidInput(format!(
                "velocity series has {} samples but altitude series has {}",
                velocities.len(),
                altitudes.len()
            )));
        }
        if !velocities.same_keys(&altitudes) {
            return Err(StageError::InvalidInput(
                "velocity and altitude series cover different time keys".into(),
            ));
        }
        if let Some((t, v)) = velocities.iter().find(|&(_, v)| v < 0.0) {
            return Err(StageError::InvalidInput(format!(
                "velocity magnitude at t = {} is negative ({})",
                t, v
            )));
        }
        Ok(Self {
            velocities,
            altitudes,
        })
    }

    /// Builds a dataset from records in any order; a repeated time key keeps the last record.
    pub fn from_records<I>(records: I) -> StageResult<Self>
    where
        I: IntoIterator<Item = TelemetryRecord>,
    {
        let (velocities, altitudes): (Vec<_>, Vec<_>) = records
            .into_iter()
            .map(|r| ((r.time, r.velocity), (r.time, r.altitude)))
            .unzip();
        Self::new(
            TimeSeries::from_unordered(velocities)?,
            TimeSeries::from_unordered(altitudes)?,
        )
    }

    pub fn velocities(&self) -> &TimeSeries {
        &self.velocities
    }

    pub fn altitudes(&self) -> &TimeSeries {
        &self.altitudes
    }

    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }

    pub fn velocity_at(&self, t: f64) -> Option<f64> {
        self.velocities.get(t)
    }

    pub fn altitude_at(&self, t: f64) -> Option<f64> {
        self.altitudes.get(t)
    }

    /// Iterates `(time, velocity, altitude)` in time order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.velocities
            .iter()
            .zip(self.altitudes.values())
            .map(|((t, v), alt)| (t, v, alt))
    }

    /// Copy of the dataset with held altitude readings interpolated.
    pub fn with_interpolated_altitudes(&self) -> TelemetryDataset {
        TelemetryDataset {
            velocities: self.velocities.clone(),
            altitudes: self.altitudes.interpolated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> TimeSeries {
        TimeSeries::new(points.to_vec()).unwrap()
    }

    #[test]
    fn rejects_empty_series() {
        let err = TelemetryDataset::new(TimeSeries::default(), TimeSeries::default()).unwrap_err();
        assert!(matches!(err, StageError::InvalidInput(_)));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = TelemetryDataset::new(
            series(&[(0.0, 1.0), (1.0, 2.0)]),
            series(&[(0.0, 0.0)]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("2 samples"));
    }

    #[test]
    fn rejects_mismatched_keys() {
        let result = TelemetryDataset::new(
            series(&[(0.0, 1.0), (1.0, 2.0)]),
            series(&[(0.0, 0.0), (1.5, 0.1)]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_magnitude() {
        let err = TelemetryDataset::new(
            series(&[(1.0, -100.0), (2.0, -100.0)]),
            series(&[(1.0, 0.05), (2.0, 0.1)]),
        )
        .unwrap_err();
        assert!(matches!(err, StageError::InvalidInput(_)));
        assert!(err.to_string().contains("t = 1"));
    }

    #[test]
    fn accepts_stationary_samples() {
        let dataset = TelemetryDataset::new(
            series(&[(1.0, 0.0), (2.0, 10.0)]),
            series(&[(1.0, 0.0), (2.0, 0.0)]),
        )
        .unwrap();
        assert_eq!(dataset.velocity_at(1.0), Some(0.0));
    }

    #[test]
    fn from_records_pairs_by_time() {
        let dataset = TelemetryDataset::from_records(vec![
            TelemetryRecord {
                time: 1.0,
                velocity: 20.0,
                altitude: 0.1,
            },
            TelemetryRecord {
                time: 0.5,
                velocity: 10.0,
                altitude: 0.0,
            },
        ])
        .unwrap();
        assert_eq!(
            dataset.samples().collect::<Vec<_>>(),
            vec![(0.5, 10.0, 0.0), (1.0, 20.0, 0.1)]
        );
        assert_eq!(dataset.velocity_at(1.0), Some(20.0));
    }

    #[test]
    fn interpolation_touches_only_altitudes() {
        let dataset = TelemetryDataset::new(
            series(&[(0.0, 5.0), (1.0, 5.0), (2.0, 7.0)]),
            series(&[(0.0, 0.0), (1.0, 0.0), (2.0, 1.0)]),
        )
        .unwrap();
        let processed = dataset.with_interpolated_altitudes();
        assert_eq!(processed.velocities(), dataset.velocities());
        assert_eq!(processed.altitude_at(1.0), Some(0.5));
    }
}
