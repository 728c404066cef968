use crate::prelude::StageKind;
use log::{error, info, warn};

/// Stage-scoped wrapper over the `log` facade.
pub struct LogManager {
    scope: String,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            scope: "pipeline".to_string(),
        }
    }

    pub fn for_stage(kind: StageKind) -> Self {
        Self {
            scope: kind.to_string(),
        }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.scope, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.scope, message);
    }

    pub fn fault(&self, message: &str) {
        error!("[{}] {}", self.scope, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
