use serde::{Deserialize, Serialize};
use telemcore::processing::{StageHandle, StageState};

/// Progress of one stage as reported to plot clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageStatus {
    pub stage: usize,
    pub name: String,
    pub state: StageState,
    pub rows: usize,
    pub version: u64,
}

impl StageStatus {
    pub fn from_handle(handle: &StageHandle) -> Self {
        Self {
            stage: handle.kind().number(),
            name: handle.kind().to_string(),
            state: handle.state(),
            rows: handle.plot().len(),
            version: handle.plot().version(),
        }
    }
}
