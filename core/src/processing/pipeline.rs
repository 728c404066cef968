use crate::model::TelemetryDataset;
use crate::prelude::{PipelineConfig, StageError, StageKind, StageOutput, StageResult};
use crate::processing::adjustment::AdjustmentStage;
use crate::processing::extraction::ExtractionStage;
use crate::processing::smoothing::SmoothingStage;
use crate::processing::stage::{spawn_stage, StageHandle};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::sync::Arc;
use std::thread::JoinHandle;

/// The three-stage velocity pipeline, one thread per stage.
///
/// Each stage waits on its predecessor's latch before reading its output, so only whole
/// stages are sequenced; live consumers can watch every stage's plot buffer in the meantime.
pub struct Pipeline {
    handles: [Arc<StageHandle>; 3],
    workers: Vec<JoinHandle<()>>,
    metrics: Arc<MetricsRecorder>,
}

impl Pipeline {
    /// Validates `config` and starts all three stages.
    pub fn spawn(dataset: TelemetryDataset, config: &PipelineConfig) -> StageResult<Self> {
        config.validate()?;
        let logger = LogManager::new();
        logger.record(&format!(
            "starting pipeline: {} samples, horizon {} s, {}-tap kernel",
            dataset.len(),
            config.horizon_s,
            config.kernel.len()
        ));

        let dataset = Arc::new(dataset);
        let extraction = StageHandle::new(StageKind::Extraction, None);
        let smoothing = StageHandle::new(StageKind::Smoothing, Some(extraction.clone()));
        let adjustment = StageHandle::new(StageKind::Adjustment, Some(smoothing.clone()));
        let metrics = Arc::new(MetricsRecorder::new());

        let workers = vec![
            spawn_stage(
                ExtractionStage::new(dataset, config.horizon_s),
                extraction.clone(),
                metrics.clone(),
            )?,
            spawn_stage(
                SmoothingStage::new(config.kernel.clone()),
                smoothing.clone(),
                metrics.clone(),
            )?,
            spawn_stage(AdjustmentStage::new(), adjustment.clone(), metrics.clone())?,
        ];

        Ok(Self {
            handles: [extraction, smoothing, adjustment],
            workers,
            metrics,
        })
    }

    pub fn stage(&self, kind: StageKind) -> &Arc<StageHandle> {
        &self.handles[kind.number() - 1]
    }

    pub fn stages(&self) -> &[Arc<StageHandle>] {
        &self.handles
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Waits for the final stage and every stage thread; returns the adjusted output.
    pub fn join(self) -> StageResult<Arc<StageOutput>> {
        let result = self.stage(StageKind::Adjustment).join();
        for worker in self.workers {
            worker
                .join()
                .map_err(|_| StageError::Internal("stage thread panicked".into()))?;
        }
        result
    }
}
