use crate::math::decomposition::decompose;
use crate::model::TelemetryDataset;
use crate::prelude::{ProcessingStage, StageError, StageKind, StageOutput, StageResult};
use crate::processing::plot_buffer::PlotBuffer;
use crate::processing::track::AscentTrack;
use std::sync::Arc;

/// Stage 1: interpolates held altitude readings and extracts an initial velocity vector per
/// sample that keeps the integrated climb on the measured altitude.
///
/// Stops after the first sample past the horizon.
pub struct ExtractionStage {
    dataset: Arc<TelemetryDataset>,
    horizon_s: f64,
}

impl ExtractionStage {
    pub fn new(dataset: Arc<TelemetryDataset>, horizon_s: f64) -> Self {
        Self { dataset, horizon_s }
    }
}

impl ProcessingStage for ExtractionStage {
    fn kind(&self) -> StageKind {
        StageKind::Extraction
    }

    fn compute(
        &mut self,
        prior: Option<Arc<StageOutput>>,
        plot: &PlotBuffer,
    ) -> StageResult<StageOutput> {
        if prior.is_some() {
            return Err(StageError::Internal(
                "extraction stage does not take a predecessor".into(),
            ));
        }
        if !self.horizon_s.is_finite() || self.horizon_s <= 0.0 {
            return Err(StageError::InvalidInput(format!(
                "horizon must be finite and positive, got {}",
                self.horizon_s
            )));
        }

        let processed = Arc::new(self.dataset.with_interpolated_altitudes());
        let mut track = AscentTrack::with_capacity(processed.len());

        for (t, v, alt) in processed.samples() {
            let dt = track.elapsed(t);
            let velocity = decompose(v, track.altitude_km(), alt, dt);
            track.record(t, velocity, v, alt, plot)?;

            if t > self.horizon_s {
                break;
            }
        }

        Ok(track.finish(processed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeSeries;

    fn dataset(points: &[(f64, f64, f64)]) -> Arc<TelemetryDataset> {
        let velocities = TimeSeries::new(points.iter().map(|p| (p.0, p.1)).collect()).unwrap();
        let altitudes = TimeSeries::new(points.iter().map(|p| (p.0, p.2)).collect()).unwrap();
        Arc::new(TelemetryDataset::new(velocities, altitudes).unwrap())
    }

    #[test]
    fn extraction_tracks_measured_altitude() {
        let data = dataset(&[(1.0, 100.0, 0.05), (2.0, 100.0, 0.1), (3.0, 100.0, 0.3)]);
        let plot = PlotBuffer::new();
        let output = ExtractionStage::new(data, 200.0)
            .compute(None, &plot)
            .unwrap();

        let samples: Vec<_> = output.profile.iter().collect();
        assert_eq!(samples.len(), 3);
        assert!((samples[0].1.y() - 50.0).abs() < 1e-9);
        assert!((samples[0].1.x() - 7500f64.sqrt()).abs() < 1e-9);
        assert!((samples[2].1.y() - 100.0).abs() < 1e-9);
        assert_eq!(samples[2].1.x(), 0.0);

        let rows = plot.snapshot().rows;
        assert_eq!(rows.len(), 3);
        assert!(rows[0].velocity_error.abs() < 1e-9);
        assert!(rows[1].altitude_error.abs() < 1e-9);
        assert!((rows[2].altitude_error - (0.2 - 0.3)).abs() < 1e-9);
    }

    #[test]
    fn stops_after_first_sample_past_horizon() {
        let points: Vec<_> = (1..=6)
            .map(|i| (i as f64 * 50.0, 300.0, i as f64))
            .collect();
        let plot = PlotBuffer::new();
        let output = ExtractionStage::new(dataset(&points), 200.0)
            .compute(None, &plot)
            .unwrap();

        let times: Vec<f64> = output.profile.iter().map(|(t, _)| t).collect();
        assert_eq!(times, vec![50.0, 100.0, 150.0, 200.0, 250.0]);
        assert_eq!(plot.len(), 5);
        assert_eq!(output.processed.len(), 6);
    }

    #[test]
    fn processed_dataset_carries_interpolated_altitudes() {
        let data = dataset(&[(1.0, 10.0, 0.0), (2.0, 10.0, 0.0), (3.0, 10.0, 0.02)]);
        let output = ExtractionStage::new(data, 200.0)
            .compute(None, &PlotBuffer::new())
            .unwrap();
        assert_eq!(output.processed.altitude_at(2.0), Some(0.01));
        assert_eq!(output.metadata.sample_count, 3);
    }

    #[test]
    fn rejects_non_positive_horizon() {
        let data = dataset(&[(1.0, 10.0, 0.0)]);
        let plot = PlotBuffer::new();
        let err = ExtractionStage::new(data, 0.0)
            .compute(None, &plot)
            .unwrap_err();
        assert!(matches!(err, StageError::InvalidInput(_)));
        assert!(plot.is_empty());
    }
}
