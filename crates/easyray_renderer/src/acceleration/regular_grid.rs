//! Uniform spatial grid with incremental 3D traversal.
//!
//! Bounded surfaces are bucketed into every cell their box overlaps. A query
//! walks the cells the ray crosses, nearest first, and stops at the first
//! cell holding a hit that lies inside it. Unbounded surfaces (planes) sit
//! in a side list and are tested on every query.

use std::collections::HashMap;
use std::sync::Arc;

use easyray_math::{Aabb, Ray, Vec3};

use super::AccelerationStructure;
use crate::hit::HitPoint;
use crate::surface::Surface;

/// Minimum width of the grid box along any axis.
const MIN_EXTENT: f64 = 1e-4;

/// Upper bound on cells along one axis.
const MAX_CELLS_PER_AXIS: usize = 256;

/// Slack when deciding whether a hit lies inside the current cell.
const CELL_TOLERANCE: f64 = 1e-9;

/// Rays whose box exit is closer than this are treated as missing the grid.
const SLAB_EPSILON: f64 = 1e-9;

type CellIndex = [usize; 3];

pub struct RegularGrid {
    surfaces: Arc<Vec<Surface>>,
    bounds: Aabb,
    cell_size: Vec3,
    counts: [usize; 3],
    cells: HashMap<CellIndex, Vec<usize>>,
    unbounded: Vec<usize>,
}

impl RegularGrid {
    /// Build a grid over `surfaces`.
    ///
    /// The bounding box of all bounded surfaces is split into cubes of side
    /// `cbrt(volume / n)`; `density` multiplies the cell count per axis.
    pub fn new(surfaces: Arc<Vec<Surface>>, density: u32) -> Self {
        let (unbounded, bounded): (Vec<usize>, Vec<usize>) = (0..surfaces.len())
            .partition(|&i| surfaces[i].bounding_box().is_degenerate());

        if bounded.is_empty() {
            log::info!(
                "RegularGrid: no bounded surfaces, {} unbounded",
                unbounded.len()
            );
            return Self {
                surfaces,
                bounds: Aabb::EMPTY,
                cell_size: Vec3::ZERO,
                counts: [0; 3],
                cells: HashMap::new(),
                unbounded,
            };
        }

        let bounds = bounded
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| {
                Aabb::surrounding(&acc, &surfaces[i].bounding_box())
            })
            .pad_to_minimums(MIN_EXTENT);

        let extent = bounds.extent();
        let volume = extent.x * extent.y * extent.z;
        let side = (volume / bounded.len() as f64).cbrt();
        let density = density.max(1) as f64;
        let counts = [0, 1, 2].map(|axis| {
            let n = (density * extent[axis] / side).floor();
            (n as usize).clamp(1, MAX_CELLS_PER_AXIS)
        });
        let cell_size = extent / Vec3::new(counts[0] as f64, counts[1] as f64, counts[2] as f64);

        let mut grid = Self {
            surfaces,
            bounds,
            cell_size,
            counts,
            cells: HashMap::new(),
            unbounded,
        };

        for &index in &bounded {
            let bbox = grid.surfaces[index].bounding_box();
            let lo = grid.cell_of(bbox.min());
            let hi = grid.cell_of(bbox.max());
            for x in lo[0]..=hi[0] {
                for y in lo[1]..=hi[1] {
                    for z in lo[2]..=hi[2] {
                        grid.cells.entry([x, y, z]).or_default().push(index);
                    }
                }
            }
        }

        log::info!(
            "RegularGrid: {}x{}x{} cells ({} occupied), {} bounded, {} unbounded surfaces",
            counts[0],
            counts[1],
            counts[2],
            grid.cells.len(),
            bounded.len(),
            grid.unbounded.len()
        );

        grid
    }

    /// Cells along each axis.
    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Surfaces bucketed into `cell`.
    pub fn cell(&self, cell: CellIndex) -> &[usize] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of the surfaces tested on every query.
    pub fn unbounded(&self) -> &[usize] {
        &self.unbounded
    }

    /// Cell containing `p`, clamped to the grid.
    fn cell_of(&self, p: Vec3) -> CellIndex {
        let min = self.bounds.min();
        [0, 1, 2].map(|axis| {
            let offset = ((p[axis] - min[axis]) / self.cell_size[axis]).floor();
            if offset > 0.0 {
                (offset as usize).min(self.counts[axis] - 1)
            } else {
                0
            }
        })
    }

    fn test_cell<'a>(&'a self, cell: CellIndex, ray: &Ray) -> HitPoint<'a> {
        let mut local = HitPoint::miss(*ray);
        for &index in self.cell(cell) {
            local.consider(&self.surfaces[index], index);
        }
        local
    }
}

impl AccelerationStructure for RegularGrid {
    fn nearest_hit(&self, ray: &Ray) -> HitPoint<'_> {
        let mut best = HitPoint::miss(*ray);
        for &index in &self.unbounded {
            best.consider(&self.surfaces[index], index);
        }
        if self.cells.is_empty() {
            return best;
        }

        let t_enter = if self.bounds.contains_point(ray.origin) {
            0.0
        } else {
            match self.bounds.slab(ray, SLAB_EPSILON) {
                Some(span) => span.min.max(0.0),
                None => return best,
            }
        };

        let start = self.cell_of(ray.at(t_enter));
        let min = self.bounds.min();

        let mut cell = start.map(|i| i as isize);
        let mut step = [0isize; 3];
        let mut stop = [0isize; 3];
        let mut t_next = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];

        for axis in 0..3 {
            let d = ray.direction[axis];
            let size = self.cell_size[axis];
            let i = cell[axis] as f64;
            if d > 0.0 {
                step[axis] = 1;
                stop[axis] = self.counts[axis] as isize;
                t_next[axis] = (min[axis] + (i + 1.0) * size - ray.origin[axis]) / d;
                t_delta[axis] = size / d;
            } else if d < 0.0 {
                step[axis] = -1;
                stop[axis] = -1;
                t_next[axis] = (min[axis] + i * size - ray.origin[axis]) / d;
                t_delta[axis] = -size / d;
            } else {
                // Never crosses a boundary on this axis
                stop[axis] = -1;
            }
        }

        // Closest hit seen whose point lay beyond the cell it was found in
        let mut pending = HitPoint::miss(*ray);

        loop {
            let axis = if t_next[0] < t_next[1] {
                if t_next[0] < t_next[2] { 0 } else { 2 }
            } else if t_next[1] < t_next[2] {
                1
            } else {
                2
            };
            let exit = t_next[axis];

            let key = [cell[0] as usize, cell[1] as usize, cell[2] as usize];
            let local = self.test_cell(key, ray);
            if local.is_hit() {
                if local.t() <= exit + CELL_TOLERANCE * exit.abs().max(1.0) {
                    return local.closer(pending).closer(best);
                }
                pending = pending.closer(local);
            }

            cell[axis] += step[axis];
            if step[axis] == 0 || cell[axis] == stop[axis] {
                break;
            }
            t_next[axis] += t_delta[axis];
        }

        pending.closer(best)
    }

    fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceleration::FreeObjects;
    use crate::surface::{Material, Plane, Rectangle, Sphere, Triangle};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vec(rng: &mut StdRng, range: f64) -> Vec3 {
        Vec3::new(
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
        )
    }

    fn mixed_scene(rng: &mut StdRng) -> Vec<Surface> {
        let mut surfaces = Vec::new();
        for _ in 0..30 {
            surfaces.push(Surface::Sphere(Sphere::new(
                random_vec(rng, 8.0),
                rng.gen_range(0.2..1.5),
                Material::default(),
            )));
        }
        for _ in 0..30 {
            let base = random_vec(rng, 8.0);
            surfaces.push(Surface::Triangle(Triangle::new(
                [base, base + random_vec(rng, 2.0), base + random_vec(rng, 2.0)],
                Material::default(),
            )));
        }
        for _ in 0..10 {
            surfaces.push(Surface::Rectangle(Rectangle::new(
                random_vec(rng, 8.0),
                random_vec(rng, 2.0),
                random_vec(rng, 2.0),
                Material::default(),
            )));
        }
        // Axis-aligned flat rectangle: zero extent on z
        surfaces.push(Surface::Rectangle(Rectangle::new(
            Vec3::new(-3.0, -3.0, 2.0),
            Vec3::new(6.0, 0.0, 0.0),
            Vec3::new(0.0, 6.0, 0.0),
            Material::default(),
        )));
        surfaces.push(Surface::Plane(Plane::new(
            Vec3::new(0.0, -12.0, 0.0),
            Vec3::new(0.1, 1.0, 0.0),
            Material::default(),
        )));
        surfaces
    }

    #[test]
    fn test_grid_matches_free_objects() {
        let mut rng = StdRng::seed_from_u64(2024);
        let surfaces = Arc::new(mixed_scene(&mut rng));
        let free = FreeObjects::new(surfaces.clone());

        for density in [1, 3, 6] {
            let grid = RegularGrid::new(surfaces.clone(), density);

            for i in 0..3000 {
                // Mix origins inside and well outside the grid
                let origin = random_vec(&mut rng, if i % 2 == 0 { 9.0 } else { 30.0 });
                let mut dir = random_vec(&mut rng, 1.0);
                if i % 7 == 0 {
                    // Axis-parallel rays exercise the zero-direction paths
                    dir = [Vec3::X, -Vec3::Y, Vec3::Z][i % 3];
                }
                if dir.length_squared() < 1e-6 {
                    continue;
                }
                let ray = Ray::new(origin, dir);

                let expected = free.nearest_hit(&ray);
                let actual = grid.nearest_hit(&ray);

                assert_eq!(
                    expected.index(),
                    actual.index(),
                    "density {} ray {:?}",
                    density,
                    ray
                );
                if let (Some(e), Some(a)) = (expected.hit(), actual.hit()) {
                    assert!((e.t - a.t).abs() < 1e-9);
                    assert!((e.point - a.point).length() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_known_surface_round_trip() {
        let surfaces: Vec<Surface> = (0..10)
            .map(|i| {
                Surface::Sphere(Sphere::new(
                    Vec3::new(i as f64 * 3.0, 0.0, 0.0),
                    1.0,
                    Material::default(),
                ))
            })
            .collect();
        let surfaces = Arc::new(surfaces);

        for density in [1, 2, 3, 5] {
            let grid = RegularGrid::new(surfaces.clone(), density);
            for k in 0..10 {
                // Straight down onto sphere k, clear of every other one
                let ray = Ray::new(Vec3::new(k as f64 * 3.0, 10.0, 0.0), -Vec3::Y);
                let hit = grid.nearest_hit(&ray);

                assert_eq!(hit.index(), Some(k), "density {}", density);
                assert!((hit.t() - 9.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_skewed_rectangle_matches_free_objects() {
        let surfaces = Arc::new(vec![
            Surface::Rectangle(Rectangle::new(
                Vec3::ZERO,
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.1),
                Material::default(),
            )),
            Surface::Sphere(Sphere::new(Vec3::new(6.0, 4.0, 6.0), 1.0, Material::default())),
        ]);
        let free = FreeObjects::new(surfaces.clone());

        for density in [1, 4] {
            let grid = RegularGrid::new(surfaces.clone(), density);
            for i in 0..50 {
                for j in 0..24 {
                    let origin = Vec3::new(-1.0 + i as f64 * 0.1, 9.5, -0.5 + j as f64 * 0.05);
                    let ray = Ray::new(origin, -Vec3::Y);
                    assert_eq!(
                        free.nearest_hit(&ray).index(),
                        grid.nearest_hit(&ray).index(),
                        "density {} ray {:?}",
                        density,
                        ray
                    );
                }
            }
        }
    }

    #[test]
    fn test_cell_counts() {
        let surfaces: Vec<Surface> = (0..8)
            .map(|i| {
                let c = Vec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64);
                Surface::Sphere(Sphere::new(c * 4.0, 1.0, Material::default()))
            })
            .collect();
        let grid = RegularGrid::new(Arc::new(surfaces), 2);

        // 6x6x6 box, 8 objects: cell side cbrt(27), density 2 gives 4 per axis
        let expected = (2.0 * 6.0 / 27.0f64.cbrt()).floor() as usize;
        assert!(expected == 3 || expected == 4);
        assert_eq!(grid.counts(), [expected; 3]);
        assert!(grid.unbounded().is_empty());
        assert_eq!(grid.cell([0, 0, 0]), &[0]);
    }

    #[test]
    fn test_unbounded_kept_out_of_cells() {
        let surfaces = Arc::new(vec![
            Surface::Plane(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, Material::default())),
            Surface::Sphere(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default())),
        ]);
        let grid = RegularGrid::new(surfaces, 3);

        assert_eq!(grid.unbounded(), &[0]);
        assert!(grid.cells.values().all(|list| !list.contains(&0)));

        // Misses the grid box entirely but still finds the plane
        let ray = Ray::new(Vec3::new(10.0, 5.0, 10.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = grid.nearest_hit(&ray);
        assert_eq!(hit.index(), Some(0));
        assert!((hit.t() - 6.0).abs() < 1e-12);

        // Sphere in front of the plane wins
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(grid.nearest_hit(&ray).index(), Some(1));
    }

    #[test]
    fn test_only_unbounded_surfaces() {
        let surfaces = Arc::new(vec![Surface::Plane(Plane::new(
            Vec3::ZERO,
            Vec3::Z,
            Material::default(),
        ))]);
        let grid = RegularGrid::new(surfaces, 3);

        assert_eq!(grid.counts(), [0, 0, 0]);
        let hit = grid.nearest_hit(&Ray::new(Vec3::new(0.0, 0.0, 4.0), -Vec3::Z));
        assert_eq!(hit.index(), Some(0));
    }

    #[test]
    fn test_origin_inside_grid() {
        let surfaces = Arc::new(vec![
            Surface::Sphere(Sphere::new(Vec3::new(-4.0, 0.0, 0.0), 1.0, Material::default())),
            Surface::Sphere(Sphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0, Material::default())),
        ]);
        let grid = RegularGrid::new(surfaces, 3);

        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), -Vec3::X);
        let hit = grid.nearest_hit(&ray);
        assert_eq!(hit.index(), Some(0));
        assert!((hit.t() - 3.5).abs() < 1e-12);

        // Shot from inside a sphere the far wall is found
        let ray = Ray::new(Vec3::new(4.0, 0.0, 0.0), Vec3::X);
        let hit = grid.nearest_hit(&ray);
        assert_eq!(hit.index(), Some(1));
        assert!((hit.t() - 1.0).abs() < 1e-12);
    }
}
