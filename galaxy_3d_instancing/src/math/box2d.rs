/// Double-precision 2D boxes used by the spatial grid.

use glam::DVec2;
use super::AABB;

/// 2D axis-aligned box in world units (XY plane)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box2D {
    pub min: DVec2,
    pub max: DVec2,
}

impl Box2D {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Project a 3D box on the XY plane
    pub fn from_aabb_xy(aabb: &AABB) -> Self {
        Self {
            min: DVec2::new(aabb.min.x as f64, aabb.min.y as f64),
            max: DVec2::new(aabb.max.x as f64, aabb.max.y as f64),
        }
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn area(&self) -> f64 {
        let size = self.size();
        size.x * size.y
    }

    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Inclusive overlap test (touching edges count as intersecting)
    pub fn intersects(&self, other: &Box2D) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Overlapping region, if any
    pub fn overlap(&self, other: &Box2D) -> Option<Box2D> {
        if !self.intersects(other) {
            return None;
        }
        Some(Box2D {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    pub fn contains_point(&self, point: DVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
        && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Squared distance from `point` to the closest point of the box
    pub fn distance_squared_to(&self, point: DVec2) -> f64 {
        let closest = point.clamp(self.min, self.max);
        closest.distance_squared(point)
    }
}

#[cfg(test)]
#[path = "box2d_tests.rs"]
mod tests;
