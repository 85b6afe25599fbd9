use super::*;
use glam::Vec3;

fn unit_square() -> Box2D {
    Box2D::new(DVec2::ZERO, DVec2::ONE)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_from_aabb_drops_z() {
    let aabb = AABB::new(Vec3::new(-1.0, -2.0, -100.0), Vec3::new(3.0, 4.0, 100.0));
    let b = Box2D::from_aabb_xy(&aabb);

    assert_eq!(b.min, DVec2::new(-1.0, -2.0));
    assert_eq!(b.max, DVec2::new(3.0, 4.0));
    assert_eq!(b.area(), 24.0);
    assert_eq!(b.center(), DVec2::new(1.0, 1.0));
}

#[test]
fn test_inverted_box_is_invalid() {
    assert!(unit_square().is_valid());
    assert!(!Box2D::new(DVec2::ONE, DVec2::ZERO).is_valid());
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_touching_boxes_intersect_with_degenerate_overlap() {
    let right = Box2D::new(DVec2::new(1.0, 0.0), DVec2::new(2.0, 1.0));

    assert!(unit_square().intersects(&right));
    let overlap = unit_square().overlap(&right).unwrap();
    assert_eq!(overlap.size().x, 0.0);
}

#[test]
fn test_disjoint_boxes_have_no_overlap() {
    let far = Box2D::new(DVec2::splat(5.0), DVec2::splat(6.0));
    assert!(unit_square().overlap(&far).is_none());
}

#[test]
fn test_contains_point_includes_edges() {
    assert!(unit_square().contains_point(DVec2::ONE));
    assert!(!unit_square().contains_point(DVec2::new(1.0, 1.5)));
}

#[test]
fn test_distance_squared_to_point() {
    assert_eq!(unit_square().distance_squared_to(DVec2::new(0.5, 0.5)), 0.0);
    assert_eq!(unit_square().distance_squared_to(DVec2::new(4.0, 5.0)), 25.0);
}
