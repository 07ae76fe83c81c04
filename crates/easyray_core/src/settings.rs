//! Render-wide settings and camera configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use easyray_math::Vec3;
use serde::{Deserialize, Serialize};

/// Strategy used to place 2D samples in the unit square.
///
/// Parsed leniently: any unrecognized name becomes `Single`, one centred
/// sample, so a typo degrades anti-aliasing instead of failing the render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SampleStrategy {
    /// Regular sub-grid of side floor(sqrt(n)).
    Uniform,
    /// Independent uniform draws.
    Random,
    /// Multi-jittered stratified grid.
    MultiJitter,
    /// A single sample at (0.5, 0.5).
    #[default]
    Single,
}

impl SampleStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            SampleStrategy::Uniform => "Uniform",
            SampleStrategy::Random => "Random",
            SampleStrategy::MultiJitter => "MultiJitter",
            SampleStrategy::Single => "None",
        }
    }
}

impl From<&str> for SampleStrategy {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "uniform" => SampleStrategy::Uniform,
            "random" => SampleStrategy::Random,
            "multijitter" | "multi_jitter" | "multi-jitter" => SampleStrategy::MultiJitter,
            _ => SampleStrategy::Single,
        }
    }
}

impl From<String> for SampleStrategy {
    fn from(name: String) -> Self {
        SampleStrategy::from(name.as_str())
    }
}

impl From<SampleStrategy> for String {
    fn from(strategy: SampleStrategy) -> Self {
        strategy.name().to_string()
    }
}

impl fmt::Display for SampleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which acceleration structure answers nearest-hit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccelerationChoice {
    /// Exhaustive scan of every surface.
    FreeObjects,
    /// Uniform grid; `density` scales the number of cells per object.
    RegularGrid { density: u32 },
}

impl AccelerationChoice {
    /// Density used when a grid is requested without an explicit constant.
    pub const DEFAULT_DENSITY: u32 = 3;
}

impl Default for AccelerationChoice {
    fn default() -> Self {
        AccelerationChoice::RegularGrid {
            density: Self::DEFAULT_DENSITY,
        }
    }
}

impl FromStr for AccelerationChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(':') {
            None if s == "FreeObjects" => Ok(AccelerationChoice::FreeObjects),
            None if s == "RegularGrid" => Ok(AccelerationChoice::default()),
            Some(("RegularGrid", density)) => density
                .trim()
                .parse::<u32>()
                .map(|density| AccelerationChoice::RegularGrid { density })
                .map_err(|e| format!("invalid grid density '{}': {}", density, e)),
            _ => Err(format!(
                "unknown acceleration structure '{}' (expected FreeObjects or RegularGrid:<m>)",
                s
            )),
        }
    }
}

impl TryFrom<String> for AccelerationChoice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccelerationChoice> for String {
    fn from(choice: AccelerationChoice) -> Self {
        choice.to_string()
    }
}

impl fmt::Display for AccelerationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccelerationChoice::FreeObjects => f.write_str("FreeObjects"),
            AccelerationChoice::RegularGrid { density } => write!(f, "RegularGrid:{}", density),
        }
    }
}

/// Projection used for primary rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Rays fan out from the eye point.
    #[default]
    Perspective,
    /// Parallel rays leaving the view plane.
    Orthographic,
}

/// Render-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output image width in pixels
    pub output_width: u32,
    /// Output image height in pixels
    pub output_height: u32,
    /// Where the encoded image goes
    pub output_path: PathBuf,
    /// Global weight of the ambient term
    pub ambient: f64,
    /// Global weight of the specular term
    pub specular: f64,
    /// Maximum recursion depth (0 = local shading only)
    pub max_depth: u32,
    pub acceleration: AccelerationChoice,
    /// Worker count; `None` uses the available parallelism
    pub threads: Option<usize>,
    /// Seed for every random sample drawn during the render
    pub seed: u64,
    /// Rays spawned per glossy reflection
    pub glossy_samples: u32,
    /// Side of the square pixel buckets dealt to workers
    pub bucket_size: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            output_width: 400,
            output_height: 400,
            output_path: PathBuf::from("render.png"),
            ambient: 0.1,
            specular: 0.5,
            max_depth: 3,
            acceleration: AccelerationChoice::default(),
            threads: None,
            seed: 0,
            glossy_samples: 16,
            bucket_size: 16,
        }
    }
}

/// Camera placement, film and sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub eye: Vec3,
    pub lookat: Vec3,
    pub up: Vec3,
    /// Internal film resolution used for primary rays
    pub film_width: u32,
    pub film_height: u32,
    /// Size of the view plane relative to the field of view
    pub pixel_width: f64,
    /// Field of view in degrees
    pub fov: f64,
    pub mode: RenderMode,
    pub sample_strategy: SampleStrategy,
    pub sample_count: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            lookat: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            film_width: 400,
            film_height: 400,
            pixel_width: 1.0,
            fov: 60.0,
            mode: RenderMode::Perspective,
            sample_strategy: SampleStrategy::Single,
            sample_count: 1,
        }
    }
}
