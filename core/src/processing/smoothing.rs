use crate::math::filter::TransferFilter;
use crate::math::vector2d::Vector2D;
use crate::prelude::{ProcessingStage, StageError, StageKind, StageOutput, StageResult};
use crate::processing::plot_buffer::PlotBuffer;
use crate::processing::stage::sample_at;
use crate::processing::track::AscentTrack;
use crate::telemetry::LogManager;
use std::sync::Arc;

/// Stage 2: low-pass filters the extracted X and Y components.
///
/// The first `delay = kernel.len() / 2` filter outputs are dropped and output `i + delay` is
/// keyed with input timestamp `times[i]`, which undoes the kernel's group delay. The last
/// `delay` input timestamps therefore have no smoothed sample.
pub struct SmoothingStage {
    kernel: Vec<f64>,
    logger: LogManager,
}

impl SmoothingStage {
    pub fn new(kernel: Vec<f64>) -> Self {
        Self {
            kernel,
            logger: LogManager::for_stage(StageKind::Smoothing),
        }
    }
}

impl ProcessingStage for SmoothingStage {
    fn kind(&self) -> StageKind {
        StageKind::Smoothing
    }

    fn compute(
        &mut self,
        prior: Option<Arc<StageOutput>>,
        plot: &PlotBuffer,
    ) -> StageResult<StageOutput> {
        let prior = prior.ok_or_else(|| {
            StageError::Internal("smoothing stage requires the extraction output".into())
        })?;
        let filter = TransferFilter::fir(self.kernel.clone())?;

        let (times, xs, ys) = prior.profile.components();
        let xs_filtered = filter.transform(&xs);
        let ys_filtered = filter.transform(&ys);

        let delay = filter.group_delay();
        let kept = times.len().saturating_sub(delay);
        if kept == 0 {
            self.logger.warn(&format!(
                "{} samples do not cover the {}-sample filter delay; nothing to publish",
                times.len(),
                delay
            ));
        }

        let processed = prior.processed.clone();
        let mut track = AscentTrack::with_capacity(kept);
        for (index, &t) in times.iter().take(kept).enumerate() {
            let velocity = Vector2D::new(xs_filtered[index + delay], ys_filtered[index + delay]);
            let (v, alt) = sample_at(&processed, t)?;
            track.record(t, velocity, v, alt, plot)?;
        }

        Ok(track.finish(processed))
    }
}
