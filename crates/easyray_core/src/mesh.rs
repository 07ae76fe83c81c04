//! Triangle mesh geometry imported from OBJ files.
//!
//! A `Mesh` is just positions and a flat index list. The renderer expands it
//! into individual triangle surfaces, so nothing here is ray-tracing aware.

use std::path::Path;

use easyray_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors that can occur during mesh import.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Mesh {0} has no triangles")]
    Empty(String),

    #[error("Face {face} references vertex {index}, mesh has {vertex_count}")]
    BadIndex {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::enclosing(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Load every model in an OBJ file into one mesh.
    ///
    /// Polygons are triangulated on import. Fails if the file yields no
    /// triangles at all or a face points past the vertex list.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| MeshError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let base = positions.len() as u32;
            positions.extend(
                model
                    .mesh
                    .positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
            );
            indices.extend(model.mesh.indices.iter().map(|i| base + i));
        }

        let mesh = Self::new(positions, indices);
        if mesh.triangle_count() == 0 {
            return Err(MeshError::Empty(path.display().to_string()));
        }
        mesh.check_indices()?;

        log::debug!(
            "Loaded mesh {}: {} models, {} vertices, {} triangles, bounds {:?}..{:?}",
            path.display(),
            models.len(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.bounds.min(),
            mesh.bounds.max()
        );

        Ok(mesh)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check that every face references an existing vertex.
    pub fn check_indices(&self) -> Result<(), MeshError> {
        let vertex_count = self.positions.len();
        for (face, chunk) in self.indices.chunks_exact(3).enumerate() {
            if let Some(&bad) = chunk.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::BadIndex {
                    face,
                    index: bad as usize,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Extract triangle vertices as [v0, v1, v2] triplets.
    ///
    /// Faces with out-of-range indices are skipped with a warning.
    pub fn extract_triangle_vertices(&self) -> Vec<[Vec3; 3]> {
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for chunk in self.indices.chunks_exact(3) {
            let i0 = chunk[0] as usize;
            let i1 = chunk[1] as usize;
            let i2 = chunk[2] as usize;

            // Bounds check
            if i0 >= self.positions.len()
                || i1 >= self.positions.len()
                || i2 >= self.positions.len()
            {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    i0,
                    i1,
                    i2,
                    self.positions.len()
                );
                continue;
            }

            triangles.push([self.positions[i0], self.positions[i1], self.positions[i2]]);
        }

        triangles
    }
}
