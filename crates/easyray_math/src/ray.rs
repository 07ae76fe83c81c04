use crate::Vec3;

/// A film pixel coordinate (column, row).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
}

impl Pixel {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A ray in 3D space: `origin + t * direction` for positive `t`.
///
/// Besides the geometry, a ray carries its place in the light-transport tree:
/// how deep it is, how much it contributes to its pixel (`weight`), the index
/// of the medium it travels through, and the pixel it was shot for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Always unit length.
    pub direction: Vec3,
    pub depth: u32,
    pub weight: f64,
    pub refraction_index: f64,
    pub pixel: Option<Pixel>,
}

impl Ray {
    /// Create a depth-0 ray of full weight in air, with no pixel.
    ///
    /// The direction is normalized here; passing a zero vector is a caller bug.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            depth: 0,
            weight: 1.0,
            refraction_index: 1.0,
            pixel: None,
        }
    }

    /// Create a camera ray tagged with the pixel it samples.
    pub fn primary(origin: Vec3, direction: Vec3, pixel: Pixel) -> Self {
        Self {
            pixel: Some(pixel),
            ..Self::new(origin, direction)
        }
    }

    /// Spawn a child ray one level deeper, inheriting the pixel tag.
    pub fn spawn(&self, origin: Vec3, direction: Vec3, weight: f64, refraction_index: f64) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            depth: self.depth + 1,
            weight,
            refraction_index,
            pixel: self.pixel,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}
