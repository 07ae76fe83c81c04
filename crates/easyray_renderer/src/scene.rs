//! Render-ready scene assembled from a description.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use easyray_core::{Mesh, SampleStrategy, SceneDescription, SurfaceDescription, Texture, TextureCache};
use easyray_math::Color;

use crate::light::PointLight;
use crate::surface::{
    Material, MeshTransform, Plane, PlanePattern, Rectangle, Sphere, Surface, Triangle, TriangleMesh,
};

/// Surfaces, lights and background of a render.
///
/// The surface list is shared with the acceleration structure and never
/// mutated once built.
#[derive(Debug, Clone)]
pub struct Scene {
    surfaces: Arc<Vec<Surface>>,
    emitters: Vec<usize>,
    pub lights: Vec<PointLight>,
    pub background: Color,
    pub emitter_strategy: SampleStrategy,
    pub emitter_samples: u32,
}

impl Scene {
    pub fn new(surfaces: Vec<Surface>, lights: Vec<PointLight>, background: Color) -> Self {
        let defaults = SceneDescription::default();
        let emitters = surfaces
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_emitter())
            .map(|(i, _)| i)
            .collect();

        Self {
            surfaces: Arc::new(surfaces),
            emitters,
            lights,
            background,
            emitter_strategy: defaults.emitter_sample_strategy,
            emitter_samples: defaults.emitter_sample_count,
        }
    }

    pub fn with_emitter_sampling(mut self, strategy: SampleStrategy, count: u32) -> Self {
        self.emitter_strategy = strategy;
        self.emitter_samples = count;
        self
    }

    /// Build the scene described by `desc`.
    ///
    /// Relative texture and mesh paths resolve against `base_dir`. A texture
    /// that fails to load leaves its surface solid; a mesh that fails to load
    /// is skipped. Both cases are logged.
    pub fn from_description(desc: &SceneDescription, base_dir: Option<&Path>) -> Self {
        let mut textures = match base_dir {
            Some(dir) => TextureCache::with_base_dir(dir),
            None => TextureCache::new(),
        };

        let mut surfaces = Vec::with_capacity(desc.surfaces.len());
        for (index, entry) in desc.surfaces.iter().enumerate() {
            let material = Material::from(entry.material());
            match entry {
                SurfaceDescription::Sphere {
                    center,
                    radius,
                    texture,
                    ..
                } => {
                    let mut sphere = Sphere::new(*center, *radius, material);
                    if let Some(image) = load_texture(&mut textures, texture.as_deref(), index) {
                        sphere = sphere.with_texture(image);
                    }
                    surfaces.push(Surface::Sphere(sphere));
                }
                SurfaceDescription::Plane {
                    point,
                    normal,
                    alternate_color,
                    pattern_direction,
                    pattern_size,
                    texture,
                    ..
                } => {
                    let pattern = match load_texture(&mut textures, texture.as_deref(), index) {
                        Some(image) => PlanePattern::Texture(image),
                        None if *alternate_color == material.color => PlanePattern::Solid,
                        None => PlanePattern::Checker {
                            alternate: *alternate_color,
                        },
                    };
                    let plane = Plane::new(*point, *normal, material).with_pattern(
                        pattern,
                        *pattern_direction,
                        *pattern_size,
                    );
                    surfaces.push(Surface::Plane(plane));
                }
                SurfaceDescription::Rectangle {
                    corner,
                    edge_a,
                    edge_b,
                    texture,
                    ..
                } => {
                    let mut rect = Rectangle::new(*corner, *edge_a, *edge_b, material);
                    if let Some(image) = load_texture(&mut textures, texture.as_deref(), index) {
                        rect = rect.with_texture(image);
                    }
                    surfaces.push(Surface::Rectangle(rect));
                }
                SurfaceDescription::Triangle { vertices, .. } => {
                    surfaces.push(Surface::Triangle(Triangle::new(*vertices, material)));
                }
                SurfaceDescription::TriangleMesh {
                    path,
                    center,
                    scale,
                    stretch,
                    rotation,
                    ..
                } => {
                    let full_path = resolve(base_dir, path);
                    match Mesh::load_obj(&full_path) {
                        Ok(mesh) => {
                            let transform = MeshTransform {
                                rotation: *rotation,
                                stretch: *stretch,
                                scale: *scale,
                                translation: *center,
                            };
                            let mesh = TriangleMesh::new(&mesh, material, transform);
                            log::debug!(
                                "Surface {}: {} triangles from {}",
                                index,
                                mesh.len(),
                                full_path.display()
                            );
                            surfaces.extend(mesh.into_triangles().into_iter().map(Surface::Triangle));
                        }
                        Err(e) => {
                            log::warn!("Surface {}: skipping mesh: {}", index, e);
                        }
                    }
                }
            }
        }

        let lights = desc.lights.iter().map(PointLight::from).collect();
        let scene = Scene::new(surfaces, lights, desc.background)
            .with_emitter_sampling(desc.emitter_sample_strategy, desc.emitter_sample_count);

        log::info!(
            "Scene: {} surfaces ({} emitters), {} point lights, {} textures",
            scene.surfaces.len(),
            scene.emitters.len(),
            scene.lights.len(),
            textures.len()
        );

        scene
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Handle to the surface list for building an acceleration structure.
    pub fn shared_surfaces(&self) -> Arc<Vec<Surface>> {
        self.surfaces.clone()
    }

    /// Indices of the area lights in the surface list.
    pub fn emitters(&self) -> &[usize] {
        &self.emitters
    }
}

fn load_texture(cache: &mut TextureCache, path: Option<&Path>, index: usize) -> Option<Arc<Texture>> {
    let path = path?;
    match cache.load(path) {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::warn!("Surface {}: using solid color: {}", index, e);
            None
        }
    }
}

fn resolve(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
