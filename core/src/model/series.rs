use crate::math::interpolation::fill_held_runs;
use crate::prelude::{StageError, StageResult};
use serde::Serialize;

/// Ordered mapping from strictly increasing time keys (seconds) to a scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<(f64, f64)>,
}

impl TimeSeries {
    /// Builds a series from points already ordered by strictly increasing time.
    pub fn new(points: Vec<(f64, f64)>) -> StageResult<Self> {
        if let Some(&(t, v)) = points.iter().find(|(t, v)| !t.is_finite() || !v.is_finite()) {
            return Err(StageError::InvalidInput(format!(
                "non-finite sample ({}, {})",
                t, v
            )));
        }
        if let Some(pair) = points.windows(2).find(|pair| pair[1].0 <= pair[0].0) {
            return Err(StageError::InvalidInput(format!(
                "time keys must strictly increase: {} followed by {}",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self { points })
    }

    /// Builds a series from points in any order. Points sharing a time key keep the one
    /// that came last, the same as repeated inserts into an ordered map.
    pub fn from_unordered(mut points: Vec<(f64, f64)>) -> StageResult<Self> {
        points.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0));
        let mut deduped: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.0 == point.0 => *last = point,
                _ => deduped.push(point),
            }
        }
        Self::new(deduped)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().copied()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(t, _)| t)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, v)| v)
    }

    /// Value recorded at exactly time `t`.
    pub fn get(&self, t: f64) -> Option<f64> {
        self.points
            .binary_search_by(|(key, _)| key.total_cmp(&t))
            .ok()
            .map(|index| self.points[index].1)
    }

    /// True when both series carry exactly the same time keys.
    pub fn same_keys(&self, other: &TimeSeries) -> bool {
        self.len() == other.len() && self.times().zip(other.times()).all(|(a, b)| a == b)
    }

    /// Copy of this series with held runs replaced by linear ramps.
    pub fn interpolated(&self) -> TimeSeries {
        let mut points = self.points.clone();
        fill_held_runs(&mut points);
        TimeSeries { points }
    }
}
