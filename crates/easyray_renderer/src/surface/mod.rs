//! Intersectable surfaces.
//!
//! The variant set is closed: spheres, infinite planes, rectangles and
//! triangles. Triangle meshes are expanded into plain triangles when the
//! scene is built. Reflection, glossy reflection and refraction rays are
//! spawned the same way for every variant and live on [`Surface`].

mod mesh;
mod plane;
mod rectangle;
mod sphere;
mod triangle;

pub use mesh::{MeshTransform, TriangleMesh};
pub use plane::{Plane, PlanePattern};
pub use rectangle::Rectangle;
pub use sphere::Sphere;
pub use triangle::Triangle;

use easyray_core::{MaterialDescription, SampleStrategy};
use easyray_math::{Aabb, Color, Frame, Ray, Vec3};
use rand::Rng;

use crate::sampler;

/// Offset applied along spawned reflection and refraction rays.
pub const SPAWN_EPSILON: f64 = 1e-4;

/// Offset applied along rays sampling an area light.
pub const EMITTER_SAMPLE_EPSILON: f64 = 0.01;

/// Shading parameters of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    /// Phong exponent; 0 disables the highlight
    pub specular: f64,
    pub reflectivity: f64,
    /// 0 reflects as a perfect mirror
    pub glossy: f64,
    pub refractivity: f64,
    pub refraction_index: f64,
    pub emitter: bool,
}

impl Default for Material {
    fn default() -> Self {
        Material::from(&MaterialDescription::default())
    }
}

impl From<&MaterialDescription> for Material {
    fn from(desc: &MaterialDescription) -> Self {
        Self {
            color: desc.color,
            specular: desc.specular,
            reflectivity: desc.reflectivity,
            glossy: desc.glossy,
            refractivity: desc.refractivity,
            refraction_index: desc.refraction_index,
            emitter: desc.emitter,
        }
    }
}

impl Material {
    /// A plain diffuse material.
    pub fn diffuse(color: Color) -> Self {
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

/// Up to two ray parameters returned by an intersection test.
///
/// Values are unfiltered: choosing the nearest positive one is the
/// acceleration structure's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roots {
    t: [f64; 2],
    len: usize,
}

impl Roots {
    pub const NONE: Roots = Roots {
        t: [0.0; 2],
        len: 0,
    };

    pub fn one(t: f64) -> Self {
        Self { t: [t, 0.0], len: 1 }
    }

    pub fn two(t0: f64, t1: f64) -> Self {
        Self { t: [t0, t1], len: 2 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.t[..self.len].iter().copied()
    }
}

/// A surface in the scene.
#[derive(Debug, Clone)]
pub enum Surface {
    Sphere(Sphere),
    Plane(Plane),
    Rectangle(Rectangle),
    Triangle(Triangle),
}

impl Surface {
    /// Ray parameters at which `ray` crosses the surface.
    pub fn intersect(&self, ray: &Ray) -> Roots {
        match self {
            Surface::Sphere(s) => s.intersect(ray),
            Surface::Plane(p) => p.intersect(ray),
            Surface::Rectangle(r) => r.intersect(ray),
            Surface::Triangle(t) => t.intersect(ray),
        }
    }

    /// Geometric normal at `point` (unit length, not oriented to any ray).
    pub fn normal(&self, point: Vec3) -> Vec3 {
        match self {
            Surface::Sphere(s) => s.normal(point),
            Surface::Plane(p) => p.normal,
            Surface::Rectangle(r) => r.normal,
            Surface::Triangle(t) => t.normal,
        }
    }

    /// Surface color at `point`: solid, checker or texture.
    pub fn color(&self, point: Vec3) -> Color {
        match self {
            Surface::Sphere(s) => s.color(point),
            Surface::Plane(p) => p.color(point),
            Surface::Rectangle(r) => r.color(point),
            Surface::Triangle(t) => t.material.color,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Surface::Sphere(s) => &s.material,
            Surface::Plane(p) => &p.material,
            Surface::Rectangle(r) => &r.material,
            Surface::Triangle(t) => &t.material,
        }
    }

    /// Bounding box; degenerate for surfaces without finite extent.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Surface::Sphere(s) => s.bbox,
            Surface::Plane(_) => Aabb::DEGENERATE,
            Surface::Rectangle(r) => r.bbox,
            Surface::Triangle(t) => t.bbox,
        }
    }

    pub fn is_emitter(&self) -> bool {
        self.material().emitter
    }

    /// Rays from `origin` toward sample points on this surface.
    ///
    /// Empty unless the surface is an emitter with a samplable shape.
    pub fn sample_rays<R: Rng + ?Sized>(
        &self,
        origin: Vec3,
        strategy: SampleStrategy,
        count: u32,
        rng: &mut R,
    ) -> Vec<Ray> {
        if !self.is_emitter() {
            return Vec::new();
        }

        let targets: Vec<Vec3> = match self {
            Surface::Sphere(s) => sampler::samples(strategy, count, rng)
                .into_iter()
                .map(|uv| s.sample_point(uv))
                .collect(),
            Surface::Rectangle(r) => sampler::samples(strategy, count, rng)
                .into_iter()
                .map(|uv| r.sample_point(uv))
                .collect(),
            Surface::Plane(_) | Surface::Triangle(_) => Vec::new(),
        };

        targets
            .into_iter()
            .filter_map(|target| {
                let to_target = target - origin;
                if to_target.length_squared() == 0.0 {
                    return None;
                }
                let dir = to_target.normalize();
                Some(Ray::new(origin + dir * EMITTER_SAMPLE_EPSILON, dir))
            })
            .collect()
    }

    /// Mirror reflection of `ray` at `point`.
    pub fn reflection_ray(&self, ray: &Ray, point: Vec3) -> Ray {
        let dir = reflect(ray.direction, self.normal(point));
        ray.spawn(
            point + dir * SPAWN_EPSILON,
            dir,
            self.material().reflectivity * ray.weight,
            ray.refraction_index,
        )
    }

    /// `count` rays scattered around the mirror direction with a
    /// cosine-power lobe of exponent `glossy`.
    ///
    /// Each ray carries `reflectivity * weight / count`. Directions that
    /// would dip below the surface are mirrored back above it.
    pub fn glossy_rays<R: Rng + ?Sized>(
        &self,
        ray: &Ray,
        point: Vec3,
        count: u32,
        rng: &mut R,
    ) -> Vec<Ray> {
        let material = self.material();
        let normal = self.normal(point);
        let facing = if normal.dot(ray.direction) > 0.0 {
            -normal
        } else {
            normal
        };

        let mirror = reflect(ray.direction, normal);
        let frame = Frame::around(mirror);
        let samples = sampler::samples(SampleStrategy::MultiJitter, count, rng);
        let weight = material.reflectivity * ray.weight / samples.len() as f64;
        let exponent = 1.0 / (material.glossy + 1.0);

        samples
            .into_iter()
            .map(|[s0, s1]| {
                let psi = 2.0 * std::f64::consts::PI * s0;
                let theta = (1.0 - s1).powf(exponent).acos();
                let local = Vec3::new(
                    theta.sin() * psi.cos(),
                    theta.sin() * psi.sin(),
                    theta.cos(),
                );
                let mut dir = frame.to_world(local).normalize();
                if dir.dot(facing) < 0.0 {
                    dir = reflect(dir, facing);
                }
                ray.spawn(point + dir * SPAWN_EPSILON, dir, weight, ray.refraction_index)
            })
            .collect()
    }

    /// Refracted continuation of `ray` through the surface at `point`.
    ///
    /// Past the critical angle the ray reflects instead, keeping the
    /// refraction weight and the current medium.
    pub fn refraction_ray(&self, ray: &Ray, point: Vec3) -> Ray {
        let material = self.material();
        let weight = material.refractivity * ray.weight;
        let mut normal = self.normal(point);

        let mut relative = ray.refraction_index / material.refraction_index;
        let mut outgoing_index = material.refraction_index;
        if relative == 1.0 {
            // Leaving the medium back into air
            relative = ray.refraction_index;
            outgoing_index = 1.0;
        }

        let mut cosine = ray.direction.dot(normal);
        if cosine > 0.0 {
            normal = -normal;
        } else {
            cosine = -cosine;
        }

        let sin2 = relative * relative * (1.0 - cosine * cosine);
        if sin2 > 1.0 {
            let dir = reflect(ray.direction, normal);
            return ray.spawn(point + dir * SPAWN_EPSILON, dir, weight, ray.refraction_index);
        }

        let dir = ray.direction * relative + normal * (relative * cosine - (1.0 - sin2).sqrt());
        ray.spawn(point + dir * SPAWN_EPSILON, dir, weight, outgoing_index)
    }
}

/// Reflect `d` about `n`.
#[inline]
pub fn reflect(d: Vec3, n: Vec3) -> Vec3 {
    d - n * (2.0 * d.dot(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn floor(material: Material) -> Surface {
        Surface::Plane(Plane::new(Vec3::ZERO, Vec3::Y, material))
    }

    #[test]
    fn test_reflect() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(d, Vec3::Y);
        assert!((r - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-12);
    }

    #[test]
    fn test_reflection_ray() {
        let surface = floor(Material::diffuse(Color::ONE).with_reflectivity(0.5));
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let refl = surface.reflection_ray(&ray, Vec3::ZERO);

        assert_eq!(refl.depth, 1);
        assert!((refl.weight - 0.5).abs() < 1e-12);
        assert!((refl.direction - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-12);
        assert!(refl.origin.y > 0.0);
    }

    #[test]
    fn test_glossy_rays_weights_and_hemisphere() {
        let surface =
            floor(Material::diffuse(Color::ONE).with_reflectivity(0.8).with_glossy(10.0));
        let ray = Ray::new(Vec3::new(-1.0, 0.2, 0.0), Vec3::new(1.0, -0.2, 0.0));
        let mut rng = StdRng::seed_from_u64(5);
        let rays = surface.glossy_rays(&ray, Vec3::ZERO, 16, &mut rng);

        assert_eq!(rays.len(), 16);
        for r in &rays {
            assert!((r.weight - 0.8 / 16.0).abs() < 1e-12);
            assert!(r.direction.y >= 0.0, "glossy ray below surface: {:?}", r.direction);
            assert_eq!(r.depth, 1);
        }
    }

    #[test]
    fn test_refraction_straight_through() {
        let surface = floor(Material::diffuse(Color::ONE).with_refraction(1.0, 1.5));
        let ray = Ray::new(Vec3::Y, -Vec3::Y);
        let refr = surface.refraction_ray(&ray, Vec3::ZERO);

        assert!((refr.direction + Vec3::Y).length() < 1e-12);
        assert_eq!(refr.refraction_index, 1.5);
        assert!((refr.weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_refraction_bends_toward_normal() {
        let surface = floor(Material::diffuse(Color::ONE).with_refraction(1.0, 1.5));
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let refr = surface.refraction_ray(&Ray::new(Vec3::new(-1.0, 1.0, 0.0), d), Vec3::ZERO);

        // Snell: sin(out) = sin(45°) / 1.5
        let sin_out = refr.direction.x;
        assert!((sin_out - (0.5f64.sqrt() / 1.5)).abs() < 1e-12);
        assert!(refr.direction.y < 0.0);
    }

    #[test]
    fn test_refraction_leaving_medium_into_air() {
        let surface = floor(Material::diffuse(Color::ONE).with_refraction(1.0, 1.5));
        // Inside glass heading up through the surface
        let d = Vec3::new(0.3, 0.8, 0.0).normalize();
        let mut ray = Ray::new(Vec3::new(-0.3, -0.8, 0.0), d);
        ray.refraction_index = 1.5;
        let refr = surface.refraction_ray(&ray, Vec3::ZERO);

        assert_eq!(refr.refraction_index, 1.0);
        // Snell: sin(out) = 1.5 * sin(in), bending away from the normal
        assert!((refr.direction.x - 1.5 * d.x).abs() < 1e-12);
        assert!(refr.direction.y > 0.0);
        assert!(refr.origin.y > 0.0);
    }

    #[test]
    fn test_total_internal_reflection_degrades_to_mirror() {
        let surface = floor(Material::diffuse(Color::ONE).with_refraction(0.7, 1.0));
        // Travelling inside glass at a grazing angle
        let mut ray = Ray::new(Vec3::new(-1.0, -0.1, 0.0), Vec3::new(1.0, 0.1, 0.0));
        ray.refraction_index = 1.5;
        let refr = surface.refraction_ray(&ray, Vec3::ZERO);

        assert!(refr.direction.is_finite());
        assert!(refr.direction.y < 0.0, "should stay inside: {:?}", refr.direction);
        assert!((refr.weight - 0.7).abs() < 1e-12);
        assert_eq!(refr.refraction_index, 1.5);
    }

    #[test]
    fn test_non_emitter_has_no_sample_rays() {
        let surface = Surface::Sphere(Sphere::new(Vec3::ZERO, 1.0, Material::default()));
        let mut rng = StdRng::seed_from_u64(0);
        let rays = surface.sample_rays(Vec3::Y * 5.0, SampleStrategy::Random, 8, &mut rng);
        assert!(rays.is_empty());
    }

    #[test]
    fn test_emitter_sample_rays_point_at_surface() {
        let light = Surface::Sphere(Sphere::new(
            Vec3::new(0.0, 5.0, 0.0),
            1.0,
            Material::diffuse(Color::ONE).emitting(),
        ));
        let mut rng = StdRng::seed_from_u64(0);
        let rays = light.sample_rays(Vec3::ZERO, SampleStrategy::Uniform, 9, &mut rng);

        assert_eq!(rays.len(), 9);
        for r in &rays {
            assert!((r.origin.length() - EMITTER_SAMPLE_EPSILON).abs() < 1e-12);
            assert_eq!(r.depth, 0);
            assert_eq!(r.weight, 1.0);
            assert!(r.pixel.is_none());
            assert!(!light.intersect(r).is_empty());
        }
    }
}
