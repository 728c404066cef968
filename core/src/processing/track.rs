use crate::math::vector2d::Vector2D;
use crate::model::{TelemetryDataset, VelocityProfile};
use crate::prelude::{StageMetadata, StageOutput, StageResult};
use crate::processing::plot_buffer::{PlotBuffer, PlotRow};
use std::sync::Arc;

/// Accumulates a stage's profile while integrating the vertical component into an altitude
/// estimate, publishing one plot row per sample.
pub(crate) struct AscentTrack {
    last_t: f64,
    altitude_km: f64,
    profile: VelocityProfile,
    velocity_errors: Vec<f64>,
    altitude_errors: Vec<f64>,
}

impl AscentTrack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            last_t: 0.0,
            altitude_km: 0.0,
            profile: VelocityProfile::with_capacity(capacity),
            velocity_errors: Vec::with_capacity(capacity),
            altitude_errors: Vec::with_capacity(capacity),
        }
    }

    /// Elapsed time since the previous sample (since t = 0 for the first).
    pub fn elapsed(&self, t: f64) -> f64 {
        t - self.last_t
    }

    /// Altitude reached by integrating every recorded vertical component, km.
    pub fn altitude_km(&self) -> f64 {
        self.altitude_km
    }

    pub fn record(
        &mut self,
        t: f64,
        velocity: Vector2D,
        magnitude: f64,
        altitude: f64,
        plot: &PlotBuffer,
    ) -> StageResult<()> {
        let dt = self.elapsed(t);
        self.last_t = t;
        self.altitude_km += velocity.y() * dt / 1000.0;
        self.profile.push(t, velocity)?;

        let velocity_error = velocity.magnitude() - magnitude;
        let altitude_error = self.altitude_km - altitude;
        self.velocity_errors.push(velocity_error);
        self.altitude_errors.push(altitude_error);
        plot.push(PlotRow::new(t, velocity, velocity_error, altitude_error));
        Ok(())
    }

    pub fn finish(self, processed: Arc<TelemetryDataset>) -> StageOutput {
        StageOutput {
            metadata: StageMetadata::summarize(&self.velocity_errors, &self.altitude_errors),
            profile: self.profile,
            processed,
        }
    }
}
