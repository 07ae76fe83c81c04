//! Texture loading and caching for image-mapped surfaces.
//!
//! Textures are looked up by integer texel, nearest neighbour. Each surface
//! variant computes its own (column, row) from its parametrization.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use easyray_math::Color;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
///
/// Pixels are the raw 8-bit channels divided by 255, row-major, row 0 at the
/// top of the image.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    pub pixels: Vec<Color>,

    /// Source file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Look up the texel at (column, row), both truncated and clamped to
    /// the image.
    pub fn texel(&self, column: f64, row: f64) -> Color {
        let x = clamp_index(column, self.width);
        let y = clamp_index(row, self.height);
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels.get(idx).copied().unwrap_or(Color::ZERO)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Color>()
    }
}

fn clamp_index(coord: f64, size: u32) -> u32 {
    if size == 0 || !(coord > 0.0) {
        return 0;
    }
    (coord as u32).min(size - 1)
}

/// Cache for loaded textures.
///
/// Textures are loaded on-demand and shared between every surface that
/// names the same path.
pub struct TextureCache {
    /// Cached textures by file path
    textures: HashMap<PathBuf, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &Path) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_path_buf(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path.display(),
            texture.width,
            texture.height,
            texture.size_bytes() as f64 / 1024.0
        );

        Ok(texture)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a texture from a file path.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let img = image::open(path).map_err(|e| {
        TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let pixels = rgb
        .pixels()
        .map(|p| {
            Color::new(
                p[0] as f64 / 255.0,
                p[1] as f64 / 255.0,
                p[2] as f64 / 255.0,
            )
        })
        .collect();

    Ok(Texture::new(
        width,
        height,
        pixels,
        path.to_string_lossy().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Texture {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| Color::new(x as f64, y as f64, 0.0)))
            .collect();
        Texture::new(width, height, pixels, "<gradient>")
    }

    #[test]
    fn test_texel_truncates_and_clamps() {
        let tex = gradient(4, 3);

        assert_eq!(tex.texel(2.9, 1.2), Color::new(2.0, 1.0, 0.0));
        assert_eq!(tex.texel(4.0, 3.0), Color::new(3.0, 2.0, 0.0));
        assert_eq!(tex.texel(-1.0, f64::NAN), Color::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_texture_cache() {
        let mut cache = TextureCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);

        let result = cache.load(Path::new("/nonexistent/texture.png"));
        assert!(matches!(result, Err(TextureError::LoadError(_))));
        assert!(cache.is_empty(), "failed loads are not cached");
    }

    #[test]
    fn test_cache_loads_once() {
        let dir = std::env::temp_dir();
        let file = "easyray_core_texture_test.png";
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 51]));
        img.save(dir.join(file)).unwrap();

        let mut cache = TextureCache::with_base_dir(&dir);
        let a = cache.load(Path::new(file)).unwrap();
        let b = cache.load(Path::new(file)).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        let c = a.texel(1.0, 1.0);
        assert!((c.x - 1.0).abs() < 1e-12);
        assert!((c.z - 0.2).abs() < 1e-12);

        std::fs::remove_file(dir.join(file)).ok();
    }

    #[test]
    fn test_resolve_path() {
        let cache = TextureCache::with_base_dir("/scenes");
        assert_eq!(cache.resolve_path(Path::new("wood.png")), PathBuf::from("/scenes/wood.png"));
        assert_eq!(cache.resolve_path(Path::new("/abs/wood.png")), PathBuf::from("/abs/wood.png"));
    }
}
