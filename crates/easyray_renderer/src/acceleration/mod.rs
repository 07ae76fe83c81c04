//! Spatial indexes answering nearest-hit queries.
//!
//! Both structures share the scene's surface list rather than copying it,
//! and are read-only once built, so every worker queries them concurrently.

mod free_objects;
mod regular_grid;

pub use free_objects::FreeObjects;
pub use regular_grid::RegularGrid;

use std::sync::Arc;

use easyray_core::AccelerationChoice;
use easyray_math::Ray;

use crate::hit::HitPoint;
use crate::surface::Surface;

/// A queryable index over the scene's surfaces.
pub trait AccelerationStructure: Send + Sync {
    /// Closest hit with strictly positive `t`, if any.
    fn nearest_hit(&self, ray: &Ray) -> HitPoint<'_>;

    /// The indexed surfaces; hit indices refer into this slice.
    fn surfaces(&self) -> &[Surface];
}

/// Build the structure named by `choice` over `surfaces`.
pub fn build(choice: AccelerationChoice, surfaces: Arc<Vec<Surface>>) -> Box<dyn AccelerationStructure> {
    match choice {
        AccelerationChoice::FreeObjects => Box::new(FreeObjects::new(surfaces)),
        AccelerationChoice::RegularGrid { density } => Box::new(RegularGrid::new(surfaces, density)),
    }
}
