use crate::math::vector2d::Vector2D;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

/// One published row: `[time, v_x, v_y, velocity_error, altitude_error]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRow {
    pub time: f64,
    pub v_x: f64,
    pub v_y: f64,
    /// `|v| - magnitude`, m/s.
    pub velocity_error: f64,
    /// Integrated climb minus measured altitude, km.
    pub altitude_error: f64,
}

impl PlotRow {
    pub const COLUMNS: [&'static str; 5] =
        ["time", "v_x", "v_y", "velocity_error", "altitude_error"];

    pub fn new(time: f64, velocity: Vector2D, velocity_error: f64, altitude_error: f64) -> Self {
        Self {
            time,
            v_x: velocity.x(),
            v_y: velocity.y(),
            velocity_error,
            altitude_error,
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.time,
            self.v_x,
            self.v_y,
            self.velocity_error,
            self.altitude_error,
        ]
    }
}

/// Consistent copy of a plot buffer at one version.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotSnapshot {
    pub version: u64,
    pub rows: Vec<PlotRow>,
}

impl PlotSnapshot {
    /// Rows as an `(n, 5)` matrix in [`PlotRow::COLUMNS`] order.
    pub fn to_columns(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), PlotRow::COLUMNS.len()), |(row, col)| {
            self.rows[row].as_array()[col]
        })
    }
}

struct PlotState {
    rows: Vec<PlotRow>,
    version: u64,
}

/// Append-only, lock-protected column buffer written by one stage and read by live
/// consumers while the stage is still running.
///
/// Every read and write takes the lock, so readers never see a half-written row. Each push
/// bumps the version and sends the new row count on a watch channel, letting consumers
/// refresh without polling.
pub struct PlotBuffer {
    state: Mutex<PlotState>,
    notify: watch::Sender<usize>,
}

impl PlotBuffer {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            state: Mutex::new(PlotState {
                rows: Vec::new(),
                version: 0,
            }),
            notify,
        }
    }

    pub fn push(&self, row: PlotRow) {
        let len = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.rows.push(row);
            state.version += 1;
            state.rows.len()
        };
        self.notify.send_replace(len);
    }

    pub fn snapshot(&self) -> PlotSnapshot {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        PlotSnapshot {
            version: state.version,
            rows: state.rows.clone(),
        }
    }

    /// Rows appended at or after index `start`, for readers that track how far they got.
    pub fn rows_since(&self, start: usize) -> Vec<PlotRow> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.rows.get(start..).map(<[PlotRow]>::to_vec).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Receiver that observes the row count after every push.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.notify.subscribe()
    }
}

impl Default for PlotBuffer {
    fn default() -> Self {
        Self::new()
    }
}
