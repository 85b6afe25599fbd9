//! Math helpers shared by the instancing and grid modules
//!
//! Transforms are plain `glam::Mat4` values. Bounds come in two flavors:
//! a 3D single-precision `AABB` for instance bounds, and a 2D
//! double-precision `Box2D` for grid placement.

mod aabb;
mod box2d;

pub use aabb::AABB;
pub use box2d::Box2D;
