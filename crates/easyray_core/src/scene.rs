//! Scene descriptions: surfaces, materials and lights as read from a job file.
//!
//! These types are plain data. The renderer turns them into intersectable
//! surfaces; nothing here knows how to trace a ray.

use std::path::PathBuf;

use easyray_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

use crate::settings::SampleStrategy;

/// Shading parameters shared by every surface variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDescription {
    /// Base color (RGB, 0-1)
    pub color: Color,

    /// Phong specular exponent (0 disables the highlight)
    pub specular: f64,

    /// Fraction of light reflected (0-1)
    pub reflectivity: f64,

    /// Glossy exponent; 0 means a perfect mirror
    pub glossy: f64,

    /// Fraction of light refracted (0-1)
    pub refractivity: f64,

    /// Index of refraction of the medium inside the surface
    pub refraction_index: f64,

    /// Area light: the surface emits `color` and does not scatter
    pub emitter: bool,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            color: Color::splat(0.5),
            specular: 20.0,
            reflectivity: 0.0,
            glossy: 0.0,
            refractivity: 0.0,
            refraction_index: 1.0,
            emitter: false,
        }
    }
}

impl MaterialDescription {
    /// Create a diffuse material of the given color.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn with_specular(mut self, specular: f64) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f64) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_glossy(mut self, glossy: f64) -> Self {
        self.glossy = glossy;
        self
    }

    pub fn with_refraction(mut self, refractivity: f64, refraction_index: f64) -> Self {
        self.refractivity = refractivity;
        self.refraction_index = refraction_index;
        self
    }

    pub fn emitting(mut self) -> Self {
        self.emitter = true;
        self
    }
}

/// A point light: a location and the color it shines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLightDescription {
    pub location: Vec3,
    pub color: Color,
}

impl PointLightDescription {
    pub fn new(location: Vec3, color: Color) -> Self {
        Self { location, color }
    }
}

fn default_alternate_color() -> Color {
    Color::ZERO
}

fn default_pattern_direction() -> Vec3 {
    Vec3::X
}

fn default_pattern_size() -> f64 {
    1.0
}

fn default_mesh_scale() -> f64 {
    1.0
}

fn default_stretch() -> Vec3 {
    Vec3::ONE
}

/// One entry of the scene's surface list, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceDescription {
    Sphere {
        center: Vec3,
        radius: f64,
        #[serde(default)]
        material: MaterialDescription,
        /// Image mapped with spherical coordinates
        #[serde(default)]
        texture: Option<PathBuf>,
    },
    Plane {
        /// Any point on the plane
        point: Vec3,
        normal: Vec3,
        #[serde(default)]
        material: MaterialDescription,
        /// Second checker color; the material color is the first
        #[serde(default = "default_alternate_color")]
        alternate_color: Color,
        /// In-plane axis of the pattern (projected into the plane)
        #[serde(default = "default_pattern_direction")]
        pattern_direction: Vec3,
        /// Side length of one checker square or texture tile
        #[serde(default = "default_pattern_size")]
        pattern_size: f64,
        #[serde(default)]
        texture: Option<PathBuf>,
    },
    Rectangle {
        corner: Vec3,
        edge_a: Vec3,
        edge_b: Vec3,
        #[serde(default)]
        material: MaterialDescription,
        #[serde(default)]
        texture: Option<PathBuf>,
    },
    Triangle {
        vertices: [Vec3; 3],
        #[serde(default)]
        material: MaterialDescription,
    },
    TriangleMesh {
        /// OBJ file holding the faces
        path: PathBuf,
        /// Translation applied last
        #[serde(default)]
        center: Vec3,
        #[serde(default = "default_mesh_scale")]
        scale: f64,
        /// Per-axis stretch factors
        #[serde(default = "default_stretch")]
        stretch: Vec3,
        /// Spherical rotation angles (theta, phi) in radians
        #[serde(default)]
        rotation: [f64; 2],
        #[serde(default)]
        material: MaterialDescription,
    },
}

impl SurfaceDescription {
    /// Short name of the variant, for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceDescription::Sphere { .. } => "sphere",
            SurfaceDescription::Plane { .. } => "plane",
            SurfaceDescription::Rectangle { .. } => "rectangle",
            SurfaceDescription::Triangle { .. } => "triangle",
            SurfaceDescription::TriangleMesh { .. } => "triangle_mesh",
        }
    }

    pub fn material(&self) -> &MaterialDescription {
        match self {
            SurfaceDescription::Sphere { material, .. }
            | SurfaceDescription::Plane { material, .. }
            | SurfaceDescription::Rectangle { material, .. }
            | SurfaceDescription::Triangle { material, .. }
            | SurfaceDescription::TriangleMesh { material, .. } => material,
        }
    }
}

/// Everything in the world: surfaces, lights and the background.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Color returned by rays that hit nothing
    pub background: Color,

    /// Sampling used when shooting shadow rays at area lights
    pub emitter_sample_strategy: SampleStrategy,
    pub emitter_sample_count: u32,

    pub lights: Vec<PointLightDescription>,
    pub surfaces: Vec<SurfaceDescription>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            background: Color::ZERO,
            emitter_sample_strategy: SampleStrategy::Random,
            emitter_sample_count: 16,
            lights: Vec::new(),
            surfaces: Vec::new(),
        }
    }
}

impl SceneDescription {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            ..Default::default()
        }
    }

    pub fn add_light(&mut self, light: PointLightDescription) {
        self.lights.push(light);
    }

    pub fn add_surface(&mut self, surface: SurfaceDescription) {
        self.surfaces.push(surface);
    }

    pub fn emitter_count(&self) -> usize {
        self.surfaces
            .iter()
            .filter(|s| s.material().emitter)
            .count()
    }
}
