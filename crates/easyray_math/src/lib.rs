// Re-export glam for convenience
pub use glam::*;

/// Double precision vector used for every point, direction and colour.
pub type Vec3 = glam::DVec3;

/// RGB colour, components nominally in [0, 1].
pub type Color = Vec3;

// EasyRay math types
mod aabb;
mod frame;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use frame::Frame;
pub use interval::Interval;
pub use ray::{Pixel, Ray};
