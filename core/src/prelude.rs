use crate::math::filter::{TransferFilter, PM_LPF_COEFFS};
use crate::math::stats::StatsHelper;
use crate::model::{TelemetryDataset, VelocityProfile};
use crate::processing::plot_buffer::PlotBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Elapsed time after which the extraction stage stops consuming samples, seconds.
pub const DEFAULT_HORIZON_S: f64 = 200.0;

/// Shared configuration for the staged pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub horizon_s: f64,
    pub kernel: Vec<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon_s: DEFAULT_HORIZON_S,
            kernel: PM_LPF_COEFFS.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Rejects configurations that would make a stage compute garbage.
    pub fn validate(&self) -> StageResult<()> {
        if !self.horizon_s.is_finite() || self.horizon_s <= 0.0 {
            return Err(StageError::InvalidInput(format!(
                "horizon must be finite and positive, got {}",
                self.horizon_s
            )));
        }
        TransferFilter::fir(self.kernel.clone()).map(|_| ())
    }
}

/// Identifies one of the three pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    Extraction,
    Smoothing,
    Adjustment,
}

impl StageKind {
    /// One-based stage number.
    pub fn number(self) -> usize {
        match self {
            StageKind::Extraction => 1,
            StageKind::Smoothing => 2,
            StageKind::Adjustment => 3,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Extraction => "extraction",
            StageKind::Smoothing => "smoothing",
            StageKind::Adjustment => "adjustment",
        };
        write!(f, "stage {} ({})", self.number(), name)
    }
}

/// Output produced by each stage once it completes.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub profile: VelocityProfile,
    pub processed: Arc<TelemetryDataset>,
    pub metadata: StageMetadata,
}

/// Summary attached to a completed stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageMetadata {
    pub sample_count: usize,
    pub rms_velocity_error: f64,
    pub notes: Vec<String>,
}

impl StageMetadata {
    /// Summarises the per-sample errors a stage published.
    pub fn summarize(velocity_errors: &[f64], altitude_errors: &[f64]) -> Self {
        Self {
            sample_count: velocity_errors.len(),
            rms_velocity_error: StatsHelper::rms(velocity_errors),
            notes: vec![format!(
                "max altitude error {:.4} km",
                StatsHelper::max_abs(altitude_errors)
            )],
        }
    }
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{stage} failed: {reason}")]
    UpstreamFailed { stage: StageKind, reason: String },
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// A single pipeline stage.
///
/// `compute` receives the completed output of the predecessor (`None` for the first stage)
/// and publishes each row to `plot` as it goes. The runner owns sequencing; a stage never
/// blocks on anything itself.
pub trait ProcessingStage: Send {
    fn kind(&self) -> StageKind;
    fn compute(
        &mut self,
        prior: Option<Arc<StageOutput>>,
        plot: &PlotBuffer,
    ) -> StageResult<StageOutput>;
}
