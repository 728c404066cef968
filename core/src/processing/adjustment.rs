use crate::math::decomposition::rederive_x;
use crate::prelude::{ProcessingStage, StageError, StageKind, StageOutput, StageResult};
use crate::processing::plot_buffer::PlotBuffer;
use crate::processing::stage::sample_at;
use crate::processing::track::AscentTrack;
use std::sync::Arc;

/// Stage 3: keeps the smoothed vertical component and re-derives the horizontal one from the
/// measured magnitude, so every output vector has exactly the measured speed.
#[derive(Default)]
pub struct AdjustmentStage;

impl AdjustmentStage {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessingStage for AdjustmentStage {
    fn kind(&self) -> StageKind {
        StageKind::Adjustment
    }

    fn compute(
        &mut self,
        prior: Option<Arc<StageOutput>>,
        plot: &PlotBuffer,
    ) -> StageResult<StageOutput> {
        let prior = prior.ok_or_else(|| {
            StageError::Internal("adjustment stage requires the smoothing output".into())
        })?;

        let processed = prior.processed.clone();
        let mut track = AscentTrack::with_capacity(prior.profile.len());
        for (t, smoothed) in prior.profile.iter() {
            let (v, alt) = sample_at(&processed, t)?;
            let velocity = rederive_x(v, smoothed.y());
            track.record(t, velocity, v, alt, plot)?;
        }

        Ok(track.finish(processed))
    }
}
