use crate::export::csv_export::export_stages;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::warn;
use std::path::PathBuf;
use telemcore::model::TelemetryDataset;
use telemcore::prelude::{StageKind, StageMetadata};
use telemcore::processing::{Pipeline, StageState};
use telemcore::telemetry::MetricsSnapshot;

/// Final state of one stage after the run.
#[derive(Debug, Clone)]
pub struct StageSummary {
    pub stage: StageKind,
    pub state: StageState,
    pub rows: usize,
    pub metadata: Option<StageMetadata>,
}

pub struct WorkflowResult {
    pub stages: Vec<StageSummary>,
    pub final_samples: usize,
    pub metrics: MetricsSnapshot,
    pub exported: Vec<PathBuf>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Starts all three stages; they run in the background until [`finish`](Self::finish).
    pub fn start(&self, dataset: TelemetryDataset) -> anyhow::Result<Pipeline> {
        Pipeline::spawn(dataset, &self.config.to_pipeline_config())
            .context("starting velocity pipeline")
    }

    /// Waits for the pipeline, exports whatever every stage published, then reports.
    ///
    /// Rows published before a stage fault are still exported before the fault is returned.
    pub fn finish(&self, pipeline: Pipeline) -> anyhow::Result<WorkflowResult> {
        let stages = pipeline.stages().to_vec();
        let outcome = pipeline.stage(StageKind::Adjustment).join();
        let metrics = pipeline.metrics();
        // The outcome is already captured; this only reaps the stage threads.
        if let Err(err) = pipeline.join() {
            warn!("stage threads exited abnormally: {}", err);
        }

        let exported = match &self.config.output_dir {
            Some(dir) => export_stages(dir, &stages)
                .with_context(|| format!("exporting stage results to {}", dir.display()))?,
            None => Vec::new(),
        };

        let output = outcome.context("running velocity pipeline")?;
        let summaries = stages
            .iter()
            .map(|handle| StageSummary {
                stage: handle.kind(),
                state: handle.state(),
                rows: handle.plot().len(),
                metadata: handle.result().map(|result| result.metadata.clone()),
            })
            .collect();

        Ok(WorkflowResult {
            stages: summaries,
            final_samples: output.profile.len(),
            metrics,
            exported,
        })
    }

    pub fn execute(&self, dataset: TelemetryDataset) -> anyhow::Result<WorkflowResult> {
        let pipeline = self.start(dataset)?;
        self.finish(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_dataset, GeneratorConfig};
    use std::fs;

    fn short_flight() -> TelemetryDataset {
        build_dataset(&GeneratorConfig {
            duration_s: 20.0,
            sample_rate_hz: 10.0,
            seed: 5,
            ..GeneratorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn runner_executes_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WorkflowConfig {
            output_dir: Some(dir.path().to_path_buf()),
            kernel: Some(vec![0.25, 0.5, 0.25]),
            ..WorkflowConfig::default()
        };
        let result = Runner::new(cfg).execute(short_flight()).unwrap();

        assert_eq!(result.stages.len(), 3);
        assert!(result
            .stages
            .iter()
            .all(|s| s.state == StageState::Complete && s.metadata.is_some()));
        assert_eq!(result.stages[0].rows, 200);
        assert_eq!(result.final_samples, 199);
        assert_eq!(result.metrics.completed, 3);
        assert_eq!(result.metrics.published, 200 + 199 + 199);

        assert_eq!(result.exported.len(), 3);
        let stage_3 = fs::read_to_string(dir.path().join("stage_3.csv")).unwrap();
        assert_eq!(stage_3.lines().count(), 200);
    }

    #[test]
    fn adjusted_output_matches_measured_speed() {
        let runner = Runner::new(WorkflowConfig::default());
        let dataset = short_flight();
        let pipeline = runner.start(dataset.clone()).unwrap();
        let adjustment = pipeline.stage(StageKind::Adjustment).clone();
        runner.finish(pipeline).unwrap();

        let output = adjustment.result().unwrap();
        for (t, v) in output.profile.iter() {
            let measured = dataset.velocity_at(t).unwrap();
            if v.y().abs() <= measured {
                assert!((v.magnitude() - measured).abs() < 1e-9);
            } else {
                assert_eq!(v.x(), 0.0);
            }
        }
    }

    #[test]
    fn invalid_kernel_fails_before_start() {
        let cfg = WorkflowConfig {
            kernel: Some(vec![]),
            ..WorkflowConfig::default()
        };
        let err = Runner::new(cfg).execute(short_flight()).err().unwrap();
        assert!(err.to_string().contains("starting velocity pipeline"));
    }
}
