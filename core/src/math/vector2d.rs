use serde::{Deserialize, Serialize};

/// Immutable 2-D vector with double-precision components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    x: f64,
    y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl From<(f64, f64)> for Vector2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_is_euclidean_norm() {
        assert_eq!(Vector2D::new(3.0, 4.0).magnitude(), 5.0);
        assert_eq!(Vector2D::new(-3.0, -4.0).magnitude(), 5.0);
    }

    #[test]
    fn zero_is_the_default() {
        assert_eq!(Vector2D::default(), Vector2D::ZERO);
        assert_eq!(Vector2D::ZERO.magnitude(), 0.0);
    }
}
