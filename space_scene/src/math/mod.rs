//! Geometry shared by the spatial index and the query protocols.

mod aabb;
mod sphere;
mod convex_hull;
mod world_triangle;
mod sweep;

pub use aabb::AABB;
pub use sphere::Sphere;
pub use convex_hull::{ConvexHull, HullTest, MAX_HULL_PLANES};
pub use world_triangle::WorldTriangle;
pub use sweep::{SweepParams, CollisionState, CollisionHit, CollisionMode};
