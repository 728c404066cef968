use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use telemcore::prelude::{PipelineConfig, DEFAULT_HORIZON_S};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// JSON-lines telemetry; a synthetic profile is generated when absent.
    pub input: Option<PathBuf>,
    /// Directory receiving one CSV per stage.
    pub output_dir: Option<PathBuf>,
    pub horizon_s: f64,
    /// Overrides the built-in low-pass kernel.
    pub kernel: Option<Vec<f64>>,
    pub generator: GeneratorConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            input: None,
            output_dir: None,
            horizon_s: DEFAULT_HORIZON_S,
            kernel: None,
            generator: GeneratorConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        input: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        horizon_s: f64,
        seed: u64,
    ) -> Self {
        Self {
            input,
            output_dir,
            horizon_s,
            kernel: None,
            generator: GeneratorConfig {
                seed,
                ..GeneratorConfig::default()
            },
        }
    }

    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            horizon_s: self.horizon_s,
            kernel: self.kernel.clone().unwrap_or(defaults.kernel),
        }
    }
}
