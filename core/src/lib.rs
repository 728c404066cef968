//! Staged velocity-estimation core for rocket ascent telemetry.
//!
//! Raw (velocity magnitude, altitude) telemetry is refined in three stages: component
//! extraction with altitude interpolation, FIR smoothing with group-delay realignment, and
//! re-derivation of the horizontal component from the smoothed vertical one. Each stage runs
//! on its own thread, is gated on its predecessor through a one-shot latch, and publishes
//! rows incrementally to a lock-protected plot buffer for live consumers.

pub mod math;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod sync;
pub mod telemetry;

pub use math::Vector2D;
pub use model::{TelemetryDataset, TimeSeries, VelocityProfile};
pub use prelude::{PipelineConfig, ProcessingStage, StageError, StageKind, StageOutput, StageResult};
pub use processing::{Pipeline, PlotBuffer, PlotRow, PlotSnapshot, StageHandle};
pub use sync::BinaryLatch;
