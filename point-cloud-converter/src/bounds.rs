/// Axis-aligned bounds of a point set
use glam::f64::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCloudBounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for PointCloudBounds {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudBounds {
    /// Empty bounds, initialised to infinity values
    pub fn new() -> Self {
        Self {
            min: DVec3::INFINITY,
            max: DVec3::NEG_INFINITY,
        }
    }

    pub fn from_points(points: &[DVec3]) -> Self {
        let mut bounds = Self::new();
        for &p in points {
            bounds.update(p);
        }
        bounds
    }

    /// Grow to include a point
    pub fn update(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Combine two partial results from a parallel reduction
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn dimensions(&self) -> DVec3 {
        self.max - self.min
    }
}
