//! EasyRay renderer - recursive CPU ray tracing
//!
//! Traces primary rays from a [`Camera`] through a [`Scene`], shading hits
//! with point lights, area lights, reflection, glossy reflection and
//! refraction. Hits are found through an [`AccelerationStructure`]: either an
//! exhaustive scan or a uniform grid walked cell by cell. Rendering is split
//! across a fixed worker pool by the [`TracingCoordinator`].

pub mod acceleration;
mod bucket;
mod camera;
mod coordinator;
mod error;
mod hit;
mod light;
pub mod sampler;
mod scene;
pub mod surface;
mod tracer;

pub use acceleration::{AccelerationStructure, FreeObjects, RegularGrid};
pub use bucket::{generate_buckets, partition, Bucket, FilmTile, DEFAULT_BUCKET_SIZE};
pub use camera::{color_to_rgb, Camera, Film, RasterImage};
pub use coordinator::{render_job, RenderSummary, TracingCoordinator};
pub use error::{RenderError, RenderResult};
pub use hit::{Hit, HitPoint};
pub use light::PointLight;
pub use scene::Scene;
pub use surface::{Material, Surface};
pub use tracer::{TraceSettings, TraceStats, Tracer};

/// Re-export Vec3 and common math types from easyray_math
pub use easyray_math::{Aabb, Color, Interval, Pixel, Ray, Vec3};
