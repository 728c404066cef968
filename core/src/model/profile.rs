use crate::math::vector2d::Vector2D;
use crate::prelude::{StageError, StageResult};
use serde::Serialize;

/// Ordered time -> velocity vector result of one stage, grown in increasing time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VelocityProfile {
    points: Vec<(f64, Vector2D)>,
}

impl VelocityProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Appends a sample; `t` must be later than every sample already present.
    pub fn push(&mut self, t: f64, velocity: Vector2D) -> StageResult<()> {
        if let Some(&(last_t, _)) = self.points.last() {
            if t <= last_t {
                return Err(StageError::Internal(format!(
                    "profile sample at {} does not follow {}",
                    t, last_t
                )));
            }
        }
        self.points.push((t, velocity));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, Vector2D)> + '_ {
        self.points.iter().copied()
    }

    pub fn get(&self, t: f64) -> Option<Vector2D> {
        self.points
            .binary_search_by(|(key, _)| key.total_cmp(&t))
            .ok()
            .map(|index| self.points[index].1)
    }

    /// Splits the profile into ordered time, X and Y sequences.
    pub fn components(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut times = Vec::with_capacity(self.len());
        let mut xs = Vec::with_capacity(self.len());
        let mut ys = Vec::with_capacity(self.len());
        for &(t, v) in &self.points {
            times.push(t);
            xs.push(v.x());
            ys.push(v.y());
        }
        (times, xs, ys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_enforces_increasing_time() {
        let mut profile = VelocityProfile::new();
        profile.push(1.0, Vector2D::new(1.0, 2.0)).unwrap();
        assert!(profile.push(1.0, Vector2D::ZERO).is_err());
        assert!(profile.push(0.5, Vector2D::ZERO).is_err());
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn components_split_in_time_order() {
        let mut profile = VelocityProfile::with_capacity(2);
        profile.push(0.0, Vector2D::new(1.0, 2.0)).unwrap();
        profile.push(0.5, Vector2D::new(3.0, 4.0)).unwrap();
        let (times, xs, ys) = profile.components();
        assert_eq!(times, vec![0.0, 0.5]);
        assert_eq!(xs, vec![1.0, 3.0]);
        assert_eq!(ys, vec![2.0, 4.0]);
        assert_eq!(profile.get(0.5), Some(Vector2D::new(3.0, 4.0)));
    }
}
