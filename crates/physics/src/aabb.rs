use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box used for collisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    /// Minimum corner (x, y).
    pub min: Vec2,
    /// Maximum corner (x, y).
    pub max: Vec2,
}

impl Aabb2 {
    /// Create a new AABB ensuring min <= max per axis.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y);
        Self { min, max }
    }

    /// Box centred on `center` extending `half_extents` along each axis.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self::new(center - half, center + half)
    }

    /// Centre point.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half size along each axis.
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box by `amount` on every side.
    pub fn expanded(&self, amount: f32) -> Self {
        Self::new(self.min - Vec2::splat(amount), self.max + Vec2::splat(amount))
    }

    /// Tests intersection with another AABB. Touching faces count.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Whether the two boxes share any horizontal span (strictly).
    pub fn overlaps_x(&self, other: &Self) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }

    /// Whether `point` lies inside or on the box.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Tests intersection with a circle.
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Slab test for a ray. Returns the entry distance along `direction`
    /// (normalised internally), or `0.0` when `origin` is already inside.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<f32> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance < 0.0 {
            return None;
        }
        if self.contains_point(origin) {
            return Some(0.0);
        }

        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;
        for axis in 0..2 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}
