//! Render job loading and validation.
//!
//! A job is one JSON document with `settings`, `camera` and `scene`
//! sections. Everything that can be wrong with it is reported here, before
//! the renderer builds a single surface.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::{MaterialDescription, SceneDescription, SurfaceDescription};
use crate::settings::{AccelerationChoice, CameraSettings, RenderSettings};

/// Errors that can occur while loading a render job.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse job file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

/// A complete render job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderJob {
    pub settings: RenderSettings,
    pub camera: CameraSettings,
    pub scene: SceneDescription,
}

impl RenderJob {
    /// Read, parse and validate a job file.
    ///
    /// Relative texture and mesh paths stay relative; callers resolve them
    /// against [`RenderJob::base_dir`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let job = Self::from_json(&text)?;

        log::info!(
            "Loaded job {}: {} surfaces, {} lights, {}x{} film",
            path.display(),
            job.scene.surfaces.len(),
            job.scene.lights.len(),
            job.camera.film_width,
            job.camera.film_height
        );

        Ok(job)
    }

    /// Parse and validate a job from JSON text.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let job: RenderJob = serde_json::from_str(text)?;
        job.validate()?;
        Ok(job)
    }

    /// Directory that relative resource paths in `job_path` resolve against.
    pub fn base_dir(job_path: &Path) -> PathBuf {
        job_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Check every value the renderer relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        let s = &self.settings;
        if s.output_width == 0 || s.output_height == 0 {
            return Err(invalid("settings.output", "resolution must be non-zero"));
        }
        if let AccelerationChoice::RegularGrid { density: 0 } = s.acceleration {
            return Err(invalid("settings.acceleration", "grid density must be at least 1"));
        }
        if s.threads == Some(0) {
            return Err(invalid("settings.threads", "need at least one worker"));
        }
        if s.bucket_size == 0 {
            return Err(invalid("settings.bucket_size", "must be non-zero"));
        }

        let c = &self.camera;
        if c.film_width == 0 || c.film_height == 0 {
            return Err(invalid("camera.film", "resolution must be non-zero"));
        }
        if !(c.pixel_width > 0.0) {
            return Err(invalid("camera.pixel_width", "must be positive"));
        }
        if !(c.fov > 0.0 && c.fov < 180.0) {
            return Err(invalid("camera.fov", format!("{} is outside (0, 180)", c.fov)));
        }
        if (c.lookat - c.eye).length_squared() == 0.0 {
            return Err(invalid("camera.lookat", "must differ from eye"));
        }
        if c.up.cross(c.lookat - c.eye).length_squared() == 0.0 {
            return Err(invalid("camera.up", "must not be parallel to the view direction"));
        }

        for (i, surface) in self.scene.surfaces.iter().enumerate() {
            validate_surface(i, surface)?;
        }

        Ok(())
    }
}

fn validate_material(field: &str, m: &MaterialDescription) -> ConfigResult<()> {
    if m.specular < 0.0 {
        return Err(invalid(format!("{}.specular", field), "must not be negative"));
    }
    if m.glossy < 0.0 {
        return Err(invalid(format!("{}.glossy", field), "must not be negative"));
    }
    if !(0.0..=1.0).contains(&m.reflectivity) {
        return Err(invalid(format!("{}.reflectivity", field), "must lie in [0, 1]"));
    }
    if !(0.0..=1.0).contains(&m.refractivity) {
        return Err(invalid(format!("{}.refractivity", field), "must lie in [0, 1]"));
    }
    if !(m.refraction_index > 0.0) {
        return Err(invalid(format!("{}.refraction_index", field), "must be positive"));
    }
    Ok(())
}

fn validate_surface(index: usize, surface: &SurfaceDescription) -> ConfigResult<()> {
    let field = format!("scene.surfaces[{}]", index);
    validate_material(&format!("{}.material", field), surface.material())?;

    match surface {
        SurfaceDescription::Sphere { radius, .. } if *radius < 0.0 => {
            Err(invalid(format!("{}.radius", field), "must not be negative"))
        }
        SurfaceDescription::Plane {
            normal,
            pattern_size,
            ..
        } => {
            if normal.length_squared() == 0.0 {
                Err(invalid(format!("{}.normal", field), "must be non-zero"))
            } else if !(*pattern_size > 0.0) {
                Err(invalid(format!("{}.pattern_size", field), "must be positive"))
            } else {
                Ok(())
            }
        }
        SurfaceDescription::Rectangle { edge_a, edge_b, .. } => {
            if edge_a.cross(*edge_b).length_squared() == 0.0 {
                Err(invalid(format!("{}.edges", field), "edges must span an area"))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}
