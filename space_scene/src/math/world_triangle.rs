use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use super::AABB;

/// A triangle in world space; the source shape of prism sweeps.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct WorldTriangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl WorldTriangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn bounds(&self) -> AABB {
        let mut bb = AABB::inside_out();
        for v in self.vertices() {
            bb.add_point(v);
        }
        bb
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Unit normal (zero for degenerate triangles).
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalize_or_zero()
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self { v0: self.v0 + offset, v1: self.v1 + offset, v2: self.v2 + offset }
    }
}
