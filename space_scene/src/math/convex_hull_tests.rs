use glam::{Mat4, Vec3, Vec4};
use crate::error::Error;
use super::*;

fn perspective_hull() -> ConvexHull {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    ConvexHull::from_view_projection(&(projection * view)).unwrap()
}

fn cube(centre: Vec3, half: f32) -> AABB {
    AABB::from_centre_extent(centre, Vec3::splat(half))
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_from_view_projection_planes_are_normalized() {
    let hull = perspective_hull();
    assert_eq!(hull.num_planes(), 6);
    for plane in hull.planes() {
        assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_orthographic_projection_is_accepted() {
    let vp = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
    assert!(ConvexHull::from_view_projection(&vp).is_ok());
}

#[test]
fn test_zero_matrix_is_rejected() {
    let result = ConvexHull::from_view_projection(&Mat4::ZERO);
    assert!(matches!(result, Err(Error::DegenerateHull(_))));
}

#[test]
fn test_flattened_matrix_is_rejected() {
    // Collapses the z axis: the view volume has no thickness
    let vp = Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
    assert!(ConvexHull::from_view_projection(&vp).is_err());
}

#[test]
fn test_add_plane_rejects_zero_normal() {
    let mut hull = ConvexHull::new();
    assert!(hull.add_plane(Vec4::new(0.0, 0.0, 0.0, 1.0)).is_err());
    assert_eq!(hull.num_planes(), 0);
}

#[test]
fn test_add_plane_rejects_overflow() {
    let mut hull = ConvexHull::new();
    for _ in 0..MAX_HULL_PLANES {
        hull.add_plane(Vec4::new(1.0, 0.0, 0.0, 100.0)).unwrap();
    }
    assert!(hull.add_plane(Vec4::new(1.0, 0.0, 0.0, 100.0)).is_err());
}

#[test]
fn test_empty_hull_contains_everything() {
    let hull = ConvexHull::default();
    assert!(hull.contains_point(Vec3::splat(1.0e6)));
    assert!(hull.intersects_aabb(&cube(Vec3::splat(-1.0e6), 1.0)));
}

// ============================================================================
// Box hull
// ============================================================================

#[test]
fn test_from_aabb_matches_box_extent() {
    let hull = ConvexHull::from_aabb(&AABB::new(Vec3::new(0.0, -5.0, -5.0), Vec3::new(15.0, 5.0, 5.0)));
    assert!(hull.contains_point(Vec3::new(7.0, 0.0, 0.0)));
    assert!(!hull.contains_point(Vec3::new(16.0, 0.0, 0.0)));
    assert!(hull.intersects_aabb(&cube(Vec3::new(15.4, 0.0, 0.0), 0.5)));
    assert!(!hull.intersects_aabb(&cube(Vec3::new(20.0, 0.0, 0.0), 0.5)));
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_classify_inside_partial_outside() {
    let hull = perspective_hull();
    assert_eq!(hull.classify_aabb(&cube(Vec3::ZERO, 0.5)), HullTest::Inside);
    assert_eq!(hull.classify_aabb(&cube(Vec3::ZERO, 500.0)), HullTest::Partial);
    assert_eq!(hull.classify_aabb(&cube(Vec3::new(0.0, 0.0, 50.0), 1.0)), HullTest::Outside);
}

#[test]
fn test_classify_inside_out_is_outside() {
    assert_eq!(perspective_hull().classify_aabb(&AABB::inside_out()), HullTest::Outside);
}

#[test]
fn test_sphere_behind_camera_is_outside() {
    let hull = perspective_hull();
    assert!(hull.intersects_sphere(&Sphere::new(Vec3::ZERO, 1.0)));
    assert!(!hull.intersects_sphere(&Sphere::new(Vec3::new(0.0, 0.0, 20.0), 1.0)));
}
