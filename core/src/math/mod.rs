pub mod decomposition;
pub mod filter;
pub mod interpolation;
pub mod stats;
pub mod vector2d;

pub use decomposition::{decompose, rederive_x};
pub use filter::{TransferFilter, PM_LPF_COEFFS};
pub use interpolation::fill_held_runs;
pub use stats::StatsHelper;
pub use vector2d::Vector2D;
