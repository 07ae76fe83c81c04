use std::f64::consts::PI;
use std::sync::Arc;

use easyray_core::Texture;
use easyray_math::{Aabb, Color, Ray, Vec3};

use super::{Material, Roots};
use crate::sampler::Sample;

/// A sphere primitive, optionally image-mapped in spherical coordinates.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub material: Material,
    pub texture: Option<Arc<Texture>>,
    pub(crate) bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f64, material: Material) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            texture: None,
            bbox,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Both roots of the ray/sphere quadratic, or one when tangent.
    pub fn intersect(&self, ray: &Ray) -> Roots {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let b = 2.0 * oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            Roots::NONE
        } else if discriminant == 0.0 {
            Roots::one(-b / (2.0 * a))
        } else {
            let sqrtd = discriminant.sqrt();
            Roots::two((-b - sqrtd) / (2.0 * a), (-b + sqrtd) / (2.0 * a))
        }
    }

    /// Outward unit normal.
    pub fn normal(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize()
    }

    pub fn color(&self, point: Vec3) -> Color {
        let Some(texture) = &self.texture else {
            return self.material.color;
        };

        let p = point - self.center;
        let theta = p.z.atan2(p.x) + PI;
        let phi = (p.y / self.radius).clamp(-1.0, 1.0).acos();
        let column = (1.0 - theta / (2.0 * PI)) * texture.width as f64;
        let row = (phi / PI) * texture.height as f64;
        texture.texel(column, row)
    }

    /// Map a unit-square sample to a point on the sphere.
    pub fn sample_point(&self, [s0, s1]: Sample) -> Vec3 {
        let theta = 2.0 * PI * s0;
        let phi = PI * s1;
        self.center
            + Vec3::new(
                self.radius * phi.sin() * theta.cos(),
                self.radius * phi.sin() * theta.sin(),
                self.radius * phi.cos(),
            )
    }
}
