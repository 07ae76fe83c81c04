use easyray_core::Mesh;
use easyray_math::Vec3;

use super::{Material, Triangle};

/// Placement applied to every triangle of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTransform {
    /// Spherical rotation (theta, phi) in radians
    pub rotation: [f64; 2],
    pub stretch: Vec3,
    pub scale: f64,
    pub translation: Vec3,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            rotation: [0.0, 0.0],
            stretch: Vec3::ONE,
            scale: 1.0,
            translation: Vec3::ZERO,
        }
    }
}

/// Builds triangle surfaces from a face/vertex mesh.
///
/// The mesh owns its triangles until they are handed to the scene; after
/// that nothing refers back to it.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
}

impl TriangleMesh {
    /// Expand `mesh` into triangles sharing `material`, then place them:
    /// rotate, stretch x/y/z, scale, translate.
    pub fn new(mesh: &Mesh, material: Material, transform: MeshTransform) -> Self {
        let mut triangles: Vec<Triangle> = mesh
            .extract_triangle_vertices()
            .into_iter()
            .map(|vertices| Triangle::new(vertices, material))
            .collect();

        let [theta, phi] = transform.rotation;
        for tri in &mut triangles {
            if theta != 0.0 || phi != 0.0 {
                tri.rotate(theta, phi);
            }
            for axis in 0..3 {
                if transform.stretch[axis] != 1.0 {
                    tri.stretch(axis, transform.stretch[axis]);
                }
            }
            if transform.scale != 1.0 {
                tri.scale(transform.scale);
            }
            tri.translate(transform.translation);
        }

        Self { triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }
}
