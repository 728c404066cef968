pub mod adjustment;
pub mod extraction;
pub mod pipeline;
pub mod plot_buffer;
pub mod smoothing;
pub mod stage;
mod track;

pub use adjustment::AdjustmentStage;
pub use extraction::ExtractionStage;
pub use pipeline::Pipeline;
pub use plot_buffer::{PlotBuffer, PlotRow, PlotSnapshot};
pub use smoothing::SmoothingStage;
pub use stage::{run_stage, spawn_stage, StageHandle, StageState};
