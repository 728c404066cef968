pub mod dataset;
pub mod profile;
pub mod series;

pub use dataset::{TelemetryDataset, TelemetryRecord};
pub use profile::VelocityProfile;
pub use series::TimeSeries;
