//! EasyRay Core - scene descriptions and resources for the ray tracer.
//!
//! This crate provides:
//!
//! - **Descriptions**: `RenderJob` with its `RenderSettings`, `CameraSettings`
//!   and `SceneDescription` sections, loaded from JSON and validated up front
//! - **Resources**: `Texture`/`TextureCache` for image-mapped surfaces and
//!   `Mesh` face/vertex lists imported from OBJ files
//!
//! # Example
//!
//! ```ignore
//! use easyray_core::RenderJob;
//!
//! let job = RenderJob::load("scenes/spheres.json")?;
//! println!("{} surfaces, {} lights",
//!     job.scene.surfaces.len(),
//!     job.scene.lights.len());
//! ```

pub mod config;
pub mod mesh;
pub mod scene;
pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use config::{ConfigError, ConfigResult, RenderJob};
pub use mesh::{Mesh, MeshError};
pub use scene::{
    MaterialDescription, PointLightDescription, SceneDescription, SurfaceDescription,
};
pub use settings::{AccelerationChoice, CameraSettings, RenderMode, RenderSettings, SampleStrategy};
pub use texture::{Texture, TextureCache, TextureError};
