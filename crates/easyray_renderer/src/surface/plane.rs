use std::sync::Arc;

use easyray_core::Texture;
use easyray_math::{Color, Ray, Vec3};

use super::{Material, Roots};

/// How a plane colors itself.
#[derive(Debug, Clone)]
pub enum PlanePattern {
    Solid,
    /// Two-color checkerboard; the material color is the first
    Checker { alternate: Color },
    /// Image tiled across the plane
    Texture(Arc<Texture>),
}

/// An infinite plane through `point` with unit `normal`.
///
/// Patterns are laid out in the in-plane frame (`axis_u`, `axis_v`) with
/// squares or tiles of side `pattern_size`.
#[derive(Debug, Clone)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
    pub material: Material,
    pub pattern: PlanePattern,
    pub pattern_size: f64,
    axis_u: Vec3,
    axis_v: Vec3,
}

impl Plane {
    /// Create a solid plane. `normal` must be non-zero.
    pub fn new(point: Vec3, normal: Vec3, material: Material) -> Self {
        let normal = normal.normalize();
        let mut plane = Self {
            point,
            normal,
            material,
            pattern: PlanePattern::Solid,
            pattern_size: 1.0,
            axis_u: Vec3::ZERO,
            axis_v: Vec3::ZERO,
        };
        plane.set_pattern_direction(Vec3::X);
        plane
    }

    pub fn with_pattern(mut self, pattern: PlanePattern, direction: Vec3, size: f64) -> Self {
        self.pattern = pattern;
        self.pattern_size = size;
        self.set_pattern_direction(direction);
        self
    }

    /// Project `direction` into the plane and rebuild the in-plane frame.
    fn set_pattern_direction(&mut self, direction: Vec3) {
        let mut u = direction - self.normal * direction.dot(self.normal);
        if u.length_squared() < 1e-12 {
            // Direction along the normal: any in-plane axis will do
            u = easyray_math::Frame::around(self.normal).u;
        }
        self.axis_u = u.normalize();
        self.axis_v = self.normal.cross(self.axis_u).normalize();
    }

    pub fn intersect(&self, ray: &Ray) -> Roots {
        let denom = ray.direction.dot(self.normal);
        if denom == 0.0 {
            return Roots::NONE;
        }
        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if t >= 0.0 {
            Roots::one(t)
        } else {
            Roots::NONE
        }
    }

    pub fn color(&self, point: Vec3) -> Color {
        let x = self.axis_u.dot(point);
        let y = self.axis_v.dot(point);
        let size = self.pattern_size;

        match &self.pattern {
            PlanePattern::Solid => self.material.color,
            PlanePattern::Checker { alternate } => {
                let cell = (x / size) as i64 + (y / size) as i64;
                let mut even = cell & 1 == 0;
                // Truncation toward zero mirrors the parity across the axes
                if x * y < 0.0 {
                    even = !even;
                }
                if even {
                    self.material.color
                } else {
                    *alternate
                }
            }
            PlanePattern::Texture(texture) => {
                let u = ((x % size) / size).abs();
                let v = ((y % size) / size).abs();
                let column = v * (texture.width as f64 - 1.0);
                let row = (1.0 - u) * (texture.height as f64 - 1.0);
                texture.texel(column, row)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Plane {
        Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Material::default())
    }

    #[test]
    fn test_intersect() {
        let plane = floor();
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let roots: Vec<f64> = plane.intersect(&ray).iter().collect();

        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 4.0).abs() < 1e-12);
        assert!((plane.normal.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_and_behind() {
        let plane = floor();
        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(plane.intersect(&parallel).is_empty());

        let away = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(plane.intersect(&away).is_empty());
    }

    #[test]
    fn test_pattern_direction_projected() {
        let plane = floor().with_pattern(PlanePattern::Solid, Vec3::new(1.0, 5.0, 0.0), 1.0);
        assert!((plane.axis_u - Vec3::X).length() < 1e-12);
        assert!(plane.axis_u.dot(plane.normal).abs() < 1e-12);
        assert!(plane.axis_v.dot(plane.normal).abs() < 1e-12);
    }

    #[test]
    fn test_checker_alternates() {
        let white = Color::ONE;
        let black = Color::ZERO;
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, Material::diffuse(white)).with_pattern(
            PlanePattern::Checker { alternate: black },
            Vec3::X,
            1.0,
        );

        // axis_v = Y x X = -Z
        let at = |x: f64, z: f64| plane.color(Vec3::new(x, 0.0, -z));
        assert_eq!(at(0.5, 0.5), white);
        assert_eq!(at(1.5, 0.5), black);
        assert_eq!(at(1.5, 1.5), white);
        // Neighbours stay opposite across the axes
        assert_eq!(at(-0.5, 0.5), black);
        assert_eq!(at(-0.5, -0.5), white);
        assert_eq!(at(0.5, -0.5), black);
    }

    #[test]
    fn test_texture_tiles() {
        let pixels = vec![Color::X, Color::Y, Color::Z, Color::ONE];
        let texture = Arc::new(Texture::new(2, 2, pixels, "<test>"));
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, Material::default()).with_pattern(
            PlanePattern::Texture(texture),
            Vec3::X,
            2.0,
        );

        // Same position in neighbouring tiles maps to the same texel
        let a = plane.color(Vec3::new(0.2, 0.0, -1.8));
        let b = plane.color(Vec3::new(2.2, 0.0, -3.8));
        assert_eq!(a, b);
    }
}
