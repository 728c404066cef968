use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use telemcore::model::{TelemetryDataset, TelemetryRecord};

/// Configuration for generating a synthetic ascent.
///
/// The vehicle climbs vertically until `pitch_over_s`, then its flight-path angle ramps
/// linearly down to `final_pitch_deg` at `duration_s`. Altitude is reported quantised to
/// `altitude_resolution_km`, so consecutive samples repeat the same reading the way coarse
/// downlinked telemetry does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub duration_s: f64,
    pub sample_rate_hz: f64,
    /// Constant along-track acceleration, m/s².
    pub acceleration: f64,
    pub pitch_over_s: f64,
    pub final_pitch_deg: f64,
    pub altitude_resolution_km: f64,
    /// Half-width of the uniform noise added to the velocity magnitude, m/s.
    pub velocity_noise: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            duration_s: 240.0,
            sample_rate_hz: 30.0,
            acceleration: 15.0,
            pitch_over_s: 10.0,
            final_pitch_deg: 25.0,
            altitude_resolution_km: 0.1,
            velocity_noise: 0.5,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn flight_path_angle(&self, t: f64) -> f64 {
        if t <= self.pitch_over_s {
            return 90f64.to_radians();
        }
        let span = (self.duration_s - self.pitch_over_s).max(f64::EPSILON);
        let progress = ((t - self.pitch_over_s) / span).min(1.0);
        (90.0 - (90.0 - self.final_pitch_deg) * progress).to_radians()
    }

    fn quantize(&self, altitude_km: f64) -> f64 {
        if self.altitude_resolution_km > 0.0 {
            (altitude_km / self.altitude_resolution_km).floor() * self.altitude_resolution_km
        } else {
            altitude_km
        }
    }
}

pub fn build_records(config: &GeneratorConfig) -> anyhow::Result<Vec<TelemetryRecord>> {
    anyhow::ensure!(
        config.sample_rate_hz > 0.0 && config.sample_rate_hz.is_finite(),
        "sample rate must be positive, got {}",
        config.sample_rate_hz
    );
    anyhow::ensure!(
        config.duration_s > 0.0 && config.duration_s.is_finite(),
        "duration must be positive, got {}",
        config.duration_s
    );

    let step = 1.0 / config.sample_rate_hz;
    let sample_count = (config.duration_s * config.sample_rate_hz).floor() as usize;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut altitude_m = 0.0;
    let mut records = Vec::with_capacity(sample_count);

    for index in 1..=sample_count {
        let t = index as f64 * step;
        let speed = config.acceleration * t;
        altitude_m += speed * config.flight_path_angle(t).sin() * step;

        let jitter = if config.velocity_noise > 0.0 {
            rng.gen_range(-config.velocity_noise..config.velocity_noise)
        } else {
            0.0
        };

        records.push(TelemetryRecord {
            time: t,
            velocity: (speed + jitter).max(0.0),
            altitude: config.quantize(altitude_m / 1000.0),
        });
    }

    Ok(records)
}

pub fn build_dataset(config: &GeneratorConfig) -> anyhow::Result<TelemetryDataset> {
    let records = build_records(config)?;
    TelemetryDataset::from_records(records).context("assembling synthetic telemetry")
}
