use easyray_math::{Aabb, Ray, Vec3};

use super::{Material, Roots};

/// A flat triangle.
///
/// The normal follows the winding `(v1 - v0) x (v2 - v1)`. A zero-area
/// triangle has a zero normal and is never hit.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub normal: Vec3,
    pub material: Material,
    pub(crate) bbox: Aabb,
}

impl Triangle {
    pub fn new(vertices: [Vec3; 3], material: Material) -> Self {
        let mut tri = Self {
            vertices,
            normal: Vec3::ZERO,
            material,
            bbox: Aabb::EMPTY,
        };
        tri.update();
        tri
    }

    fn update(&mut self) {
        let [v0, v1, v2] = self.vertices;
        self.normal = (v1 - v0).cross(v2 - v1).normalize_or_zero();
        self.bbox = Aabb::enclosing(&self.vertices);
    }

    /// Area of (a, b, c), signed by its winding relative to the normal.
    fn signed_area(&self, a: Vec3, b: Vec3, c: Vec3) -> f64 {
        0.5 * (b - a).cross(c - b).dot(self.normal)
    }

    pub fn intersect(&self, ray: &Ray) -> Roots {
        let denom = ray.direction.dot(self.normal);
        if denom == 0.0 {
            return Roots::NONE;
        }

        let [v0, v1, v2] = self.vertices;
        let t = (v0 - ray.origin).dot(self.normal) / denom;
        if t <= 0.0 {
            return Roots::NONE;
        }

        let p = ray.at(t);
        let area = self.signed_area(v0, v1, v2);
        let inside = |a: f64| (0.0..=1.0).contains(&(a / area));
        if inside(self.signed_area(v0, v1, p))
            && inside(self.signed_area(v1, v2, p))
            && inside(self.signed_area(v2, v0, p))
        {
            Roots::one(t)
        } else {
            Roots::NONE
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
        self.update();
    }

    /// Uniform scale about the origin.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            *v *= factor;
        }
        self.update();
    }

    /// Scale one axis (0 = x, 1 = y, 2 = z) about the origin.
    pub fn stretch(&mut self, axis: usize, factor: f64) {
        for v in &mut self.vertices {
            v[axis.min(2)] *= factor;
        }
        self.update();
    }

    /// Rotate about the origin by adding `theta` to each vertex's polar
    /// angle and `phi` to its azimuth.
    pub fn rotate(&mut self, theta: f64, phi: f64) {
        for v in &mut self.vertices {
            let radius = v.length();
            if radius == 0.0 {
                continue;
            }
            let polar = (v.z / radius).clamp(-1.0, 1.0).acos() + theta;
            let azimuth = v.y.atan2(v.x) + phi;
            *v = Vec3::new(
                radius * polar.sin() * azimuth.cos(),
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
            );
        }
        self.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn xy_triangle() -> Triangle {
        Triangle::new(
            [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)],
            Material::default(),
        )
    }

    #[test]
    fn test_normal_from_winding() {
        let tri = xy_triangle();
        assert!((tri.normal - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_hit_inside_from_both_sides() {
        let tri = xy_triangle();
        let front = Ray::new(Vec3::new(0.5, 0.5, 2.0), -Vec3::Z);
        let back = Ray::new(Vec3::new(0.5, 0.5, -2.0), Vec3::Z);

        assert_eq!(tri.intersect(&front).iter().collect::<Vec<_>>(), vec![2.0]);
        assert_eq!(tri.intersect(&back).iter().collect::<Vec<_>>(), vec![2.0]);
    }

    #[test]
    fn test_miss_outside() {
        let tri = xy_triangle();
        for (x, y) in [(1.5, 1.5), (-0.1, 0.5), (0.5, -0.1)] {
            let ray = Ray::new(Vec3::new(x, y, 2.0), -Vec3::Z);
            assert!(tri.intersect(&ray).is_empty(), "({}, {}) should miss", x, y);
        }
    }

    #[test]
    fn test_degenerate_never_hit() {
        let tri = Triangle::new([Vec3::ZERO, Vec3::X, Vec3::X * 2.0], Material::default());
        assert_eq!(tri.normal, Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), -Vec3::Z);
        assert!(tri.intersect(&ray).is_empty());
    }

    #[test]
    fn test_transforms_update_bbox() {
        let mut tri = xy_triangle();
        tri.translate(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(tri.bbox.min(), Vec3::ONE);
        assert_eq!(tri.bbox.max(), Vec3::new(3.0, 3.0, 1.0));

        tri.scale(0.5);
        assert_eq!(tri.bbox.max(), Vec3::new(1.5, 1.5, 0.5));

        tri.stretch(1, 2.0);
        assert_eq!(tri.bbox.max(), Vec3::new(1.5, 3.0, 0.5));
        assert!(tri.normal.z.abs() > 0.99);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        // A quarter turn of azimuth spins the triangle about the z axis
        let mut tri = Triangle::new(
            [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 1.0)],
            Material::default(),
        );
        tri.rotate(0.0, FRAC_PI_2);
        assert!((tri.vertices[1] - Vec3::new(0.0, 1.0, 1.0)).length() < 1e-12);
        assert!((tri.vertices[2] - Vec3::new(-1.0, 0.0, 1.0)).length() < 1e-12);
        assert!((tri.normal - Vec3::Z).length() < 1e-12);
    }
}
