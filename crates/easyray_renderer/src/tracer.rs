//! Recursive Whitted-style shading.
//!
//! A ray that misses returns the background, one that strikes an area light
//! returns the light's color, and anything else is shaded from the point
//! lights and area lights plus, below the depth limit, its reflection and
//! refraction rays. Every returned color is already scaled by the ray's
//! weight.

use easyray_core::RenderSettings;
use easyray_math::{Color, Ray, Vec3};
use rand::Rng;

use crate::acceleration::AccelerationStructure;
use crate::light::PointLight;
use crate::scene::Scene;
use crate::surface::{Material, Surface, SPAWN_EPSILON};

/// Render-wide shading parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSettings {
    /// Fraction of the surface color always present
    pub ambient: f64,
    /// Weight of the Phong highlight
    pub specular: f64,
    /// Deepest ray that may still spawn children
    pub max_depth: u32,
    /// Rays per glossy reflection
    pub glossy_samples: u32,
}

impl From<&RenderSettings> for TraceSettings {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            ambient: settings.ambient,
            specular: settings.specular,
            max_depth: settings.max_depth,
            glossy_samples: settings.glossy_samples,
        }
    }
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self::from(&RenderSettings::default())
    }
}

/// Counters gathered while tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Camera, reflection, glossy and refraction rays
    pub rays: u64,
    /// Rays toward point lights and area light samples
    pub shadow_rays: u64,
}

impl TraceStats {
    pub fn merge(&mut self, other: &TraceStats) {
        self.rays += other.rays;
        self.shadow_rays += other.shadow_rays;
    }
}

/// Read-only view of everything a ray needs.
pub struct Tracer<'a> {
    scene: &'a Scene,
    accel: &'a dyn AccelerationStructure,
    settings: TraceSettings,
}

impl<'a> Tracer<'a> {
    pub fn new(
        scene: &'a Scene,
        accel: &'a dyn AccelerationStructure,
        settings: TraceSettings,
    ) -> Self {
        Self {
            scene,
            accel,
            settings,
        }
    }

    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Weighted color seen along `ray`.
    pub fn trace<R: Rng + ?Sized>(&self, ray: &Ray, rng: &mut R, stats: &mut TraceStats) -> Color {
        stats.rays += 1;

        let record = self.accel.nearest_hit(ray);
        let Some(hit) = record.hit() else {
            return self.scene.background * ray.weight;
        };

        let surface = hit.surface;
        let point = hit.point;
        let surface_color = surface.color(point);
        if surface.is_emitter() {
            return surface_color * ray.weight;
        }

        let mut normal = surface.normal(point);
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }

        let mut color =
            self.local_color(surface, point, normal, surface_color, ray, rng, stats) * ray.weight;

        if ray.depth >= self.settings.max_depth {
            return color;
        }

        let material = surface.material();
        if material.reflectivity > 0.0 {
            if material.glossy > 0.0 {
                for child in surface.glossy_rays(ray, point, self.settings.glossy_samples, rng) {
                    color += self.trace(&child, rng, stats);
                }
            } else {
                let child = surface.reflection_ray(ray, point);
                color += self.trace(&child, rng, stats);
            }
        }
        if material.refractivity > 0.0 {
            let child = surface.refraction_ray(ray, point);
            color += self.trace(&child, rng, stats);
        }

        color
    }

    /// Ambient plus direct light from point lights and area lights.
    #[allow(clippy::too_many_arguments)]
    fn local_color<R: Rng + ?Sized>(
        &self,
        surface: &Surface,
        point: Vec3,
        normal: Vec3,
        surface_color: Color,
        ray: &Ray,
        rng: &mut R,
        stats: &mut TraceStats,
    ) -> Color {
        let material = surface.material();
        let view = -ray.direction;
        let mut color = surface_color * self.settings.ambient;

        for light in &self.scene.lights {
            stats.shadow_rays += 1;
            if let Some(dir) = self.unoccluded_direction(point, light) {
                color += self.shade_light(material, surface_color, normal, view, dir, light.color);
            }
        }

        for &index in self.scene.emitters() {
            let emitter = &self.accel.surfaces()[index];
            let samples = emitter.sample_rays(
                point,
                self.scene.emitter_strategy,
                self.scene.emitter_samples,
                rng,
            );
            if samples.is_empty() {
                continue;
            }

            let mut sum = Color::ZERO;
            for sample in &samples {
                stats.shadow_rays += 1;
                let record = self.accel.nearest_hit(sample);
                // Visible only if the first thing struck is this emitter
                if let Some(hit) = record.hit().filter(|h| h.index == index) {
                    let light_color = emitter.color(hit.point);
                    sum += self.shade_light(
                        material,
                        surface_color,
                        normal,
                        view,
                        sample.direction,
                        light_color,
                    );
                }
            }
            color += sum / samples.len() as f64;
        }

        color
    }

    /// Direction toward `light` from `point`, or `None` when blocked.
    fn unoccluded_direction(&self, point: Vec3, light: &PointLight) -> Option<Vec3> {
        let to_light = light.location - point;
        let distance = to_light.length();
        if distance == 0.0 {
            return None;
        }
        let dir = to_light / distance;

        let shadow = Ray::new(point + dir * SPAWN_EPSILON, dir);
        let blocker = self.accel.nearest_hit(&shadow);
        if blocker.t() < distance - SPAWN_EPSILON {
            None
        } else {
            Some(dir)
        }
    }

    /// Diffuse plus Phong highlight for one light arriving along `dir`.
    fn shade_light(
        &self,
        material: &Material,
        surface_color: Color,
        normal: Vec3,
        view: Vec3,
        dir: Vec3,
        light_color: Color,
    ) -> Color {
        let cosine = normal.dot(dir);
        let mut color = surface_color * light_color * cosine.max(0.0);

        if material.specular > 0.0 && cosine > 0.0 {
            let mirrored = normal * (2.0 * cosine) - dir;
            let highlight = mirrored.dot(view).max(0.0).powf(material.specular);
            color += light_color * (self.settings.specular * highlight);
        }

        color
    }
}
