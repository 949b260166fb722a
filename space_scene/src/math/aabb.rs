/// Axis-aligned bounding box.
///
/// A box whose `min` exceeds its `max` on any axis is "inside out": it
/// contains nothing and is the identity for `add_bounds`. Empty octree
/// nodes and objects without bounds use this state.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// The empty box.
    pub const INSIDE_OUT: AABB = AABB {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(-f32::MAX),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_centre_extent(centre: Vec3, half_extent: Vec3) -> Self {
        Self { min: centre - half_extent, max: centre + half_extent }
    }

    pub fn inside_out() -> Self {
        Self::INSIDE_OUT
    }

    pub fn is_inside_out(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn set_inside_out(&mut self) {
        *self = Self::INSIDE_OUT;
    }

    /// Grow to include `point`.
    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow to include `other`. Inside-out boxes are ignored.
    pub fn add_bounds(&mut self, other: &AABB) {
        if other.is_inside_out() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn union(&self, other: &AABB) -> AABB {
        let mut result = *self;
        result.add_bounds(other);
        result
    }

    pub fn centre(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Largest of width, height and depth (0 when inside out).
    pub fn max_dimension(&self) -> f32 {
        if self.is_inside_out() {
            return 0.0;
        }
        self.width().max(self.height()).max(self.depth())
    }

    /// Grow by `amount` on every side.
    pub fn expand_symmetrically(&mut self, amount: Vec3) {
        if !self.is_inside_out() {
            self.min -= amount;
            self.max += amount;
        }
    }

    /// Transform this box by a matrix, returning a new box.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the box extents
    /// for a tight result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if self.is_inside_out() {
            return *self;
        }

        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Test if this box fully contains another box.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Test if the boxes overlap or touch. Inside-out boxes never intersect.
    pub fn intersects(&self, other: &AABB) -> bool {
        if self.is_inside_out() || other.is_inside_out() {
            return false;
        }
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Slab test of the segment `start..end` against this box.
    pub fn intersects_segment(&self, start: Vec3, end: Vec3) -> bool {
        if self.is_inside_out() {
            return false;
        }

        let delta = end - start;
        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;

        for axis in 0..3 {
            let d = delta[axis];
            let s = start[axis];
            if d.abs() < f32::EPSILON {
                if s < self.min[axis] || s > self.max[axis] {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - s) * inv;
            let mut t1 = (self.max[axis] - s) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }

        true
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::INSIDE_OUT
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
