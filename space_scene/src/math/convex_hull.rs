/// ConvexHull - intersection of up to 32 half-spaces.
///
/// Each plane is a Vec4 (A, B, C, D) with an inward-pointing unit normal
/// (A, B, C). A point P is inside when dot(plane, P_homogeneous) >= 0 for
/// every plane. View frusta are the common case (6 planes).

use glam::{Mat4, Vec3, Vec4};
use crate::error::{Error, Result};
use super::{AABB, Sphere};

/// Maximum number of half-spaces in one hull.
pub const MAX_HULL_PLANES: usize = 32;

/// Smallest accepted plane normal length.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Result of a 3-way hull/box classification.
///
/// Used by the octree for hierarchical culling:
/// - `Outside` -> skip the entire subtree
/// - `Inside` -> take the subtree without further plane tests
/// - `Partial` -> test contents and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullTest {
    Outside,
    Inside,
    Partial,
}

#[derive(Debug, Clone, Copy)]
pub struct ConvexHull {
    planes: [Vec4; MAX_HULL_PLANES],
    num_planes: usize,
}

impl ConvexHull {
    /// Hull with no planes; it contains everything.
    pub fn new() -> Self {
        Self { planes: [Vec4::ZERO; MAX_HULL_PLANES], num_planes: 0 }
    }

    /// Build from explicit planes. Normals are normalized.
    pub fn from_planes(planes: &[Vec4]) -> Result<Self> {
        let mut hull = Self::new();
        for plane in planes {
            hull.add_plane(*plane)?;
        }
        Ok(hull)
    }

    /// The six inward-facing planes of a box.
    pub fn from_aabb(bb: &AABB) -> Self {
        let mut hull = Self::new();
        let planes = [
            Vec4::new(1.0, 0.0, 0.0, -bb.min.x),
            Vec4::new(-1.0, 0.0, 0.0, bb.max.x),
            Vec4::new(0.0, 1.0, 0.0, -bb.min.y),
            Vec4::new(0.0, -1.0, 0.0, bb.max.y),
            Vec4::new(0.0, 0.0, 1.0, -bb.min.z),
            Vec4::new(0.0, 0.0, -1.0, bb.max.z),
        ];
        hull.planes[..6].copy_from_slice(&planes);
        hull.num_planes = 6;
        hull
    }

    /// Extract the six frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method (left, right, bottom, top, near,
    /// far). Works for perspective and orthographic projections. A singular
    /// matrix, or one producing a near-zero plane normal, describes no
    /// usable volume and is rejected.
    pub fn from_view_projection(vp: &Mat4) -> Result<Self> {
        let det = vp.determinant();
        if !det.is_finite() || det == 0.0 {
            return Err(Error::DegenerateHull(format!(
                "view-projection determinant {} is degenerate", det
            )));
        }

        let m = vp.to_cols_array_2d();
        let planes = [
            // Left:   row3 + row0
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            // Right:  row3 - row0
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            // Bottom: row3 + row1
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            // Top:    row3 - row1
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            // Near:   row3 + row2
            Vec4::new(m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]),
            // Far:    row3 - row2
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        Self::from_planes(&planes)
    }

    /// Append a half-space. Fails when the hull is full or the normal is
    /// degenerate.
    pub fn add_plane(&mut self, plane: Vec4) -> Result<()> {
        if self.num_planes == MAX_HULL_PLANES {
            return Err(Error::DegenerateHull(format!(
                "hull already holds {} planes", MAX_HULL_PLANES
            )));
        }

        let normal_len = plane.truncate().length();
        if !normal_len.is_finite() || normal_len < DEGENERATE_EPSILON {
            return Err(Error::DegenerateHull(format!(
                "plane {} has a zero-length normal", self.num_planes
            )));
        }

        self.planes[self.num_planes] = plane / normal_len;
        self.num_planes += 1;
        Ok(())
    }

    pub fn planes(&self) -> &[Vec4] {
        &self.planes[..self.num_planes]
    }

    pub fn num_planes(&self) -> usize {
        self.num_planes
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes().iter().all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Test if a box intersects this hull.
    ///
    /// "Positive vertex" test: for each plane, take the corner most along
    /// the plane normal. If that corner is outside, the box is outside.
    /// Conservative: may report false positives, never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_inside_out() {
            return false;
        }

        for plane in self.planes() {
            let normal = plane.truncate();
            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }

        true
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        if sphere.is_empty() {
            return false;
        }
        self.planes()
            .iter()
            .all(|plane| plane.truncate().dot(sphere.centre) + plane.w >= -sphere.radius)
    }

    /// Classify a box against the hull (3-way test).
    ///
    /// - p-vertex outside any plane -> `Outside` (early out)
    /// - n-vertex outside any plane -> at least `Partial`
    /// - otherwise -> `Inside`
    pub fn classify_aabb(&self, aabb: &AABB) -> HullTest {
        if aabb.is_inside_out() {
            return HullTest::Outside;
        }

        let mut all_inside = true;

        for plane in self.planes() {
            let normal = plane.truncate();

            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return HullTest::Outside;
            }

            let n_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );
            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { HullTest::Inside } else { HullTest::Partial }
    }
}

impl Default for ConvexHull {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "convex_hull_tests.rs"]
mod tests;
