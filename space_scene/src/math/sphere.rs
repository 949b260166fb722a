use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use super::AABB;

/// Bounding sphere. Used as the cheap narrow test for static objects.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Sphere {
    pub centre: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(centre: Vec3, radius: f32) -> Self {
        Self { centre, radius }
    }

    /// Smallest sphere around a box (empty sphere for inside-out boxes).
    pub fn from_aabb(bb: &AABB) -> Self {
        if bb.is_inside_out() {
            return Self { centre: Vec3::ZERO, radius: -1.0 };
        }
        Self { centre: bb.centre(), radius: bb.extent().length() * 0.5 }
    }

    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    pub fn intersects(&self, other: &Sphere) -> bool {
        let r = self.radius + other.radius;
        !self.is_empty() && !other.is_empty() && self.centre.distance_squared(other.centre) <= r * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_aabb_encloses_corners() {
        let bb = AABB::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0));
        let s = Sphere::from_aabb(&bb);
        assert_eq!(s.centre, Vec3::ONE);
        assert!((s.radius - 3.0f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_empty_sphere_never_intersects() {
        let empty = Sphere::from_aabb(&AABB::inside_out());
        assert!(empty.is_empty());
        assert!(!empty.intersects(&Sphere::new(Vec3::ZERO, 100.0)));
    }

    #[test]
    fn test_touching_spheres_intersect() {
        let a = Sphere::new(Vec3::ZERO, 1.0);
        let b = Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&Sphere::new(Vec3::new(2.1, 0.0, 0.0), 1.0)));
    }
}
