use std::sync::Arc;

use easyray_core::Texture;
use easyray_math::{Aabb, Color, Ray, Vec3};

use super::{Material, Roots};
use crate::sampler::Sample;

/// A parallelogram spanned by `edge_a` and `edge_b` from `corner`.
#[derive(Debug, Clone)]
pub struct Rectangle {
    pub corner: Vec3,
    pub edge_a: Vec3,
    pub edge_b: Vec3,
    pub normal: Vec3,
    pub material: Material,
    pub texture: Option<Arc<Texture>>,
    pub(crate) bbox: Aabb,
}

impl Rectangle {
    /// Create a rectangle. The edges must not be parallel.
    pub fn new(corner: Vec3, edge_a: Vec3, edge_b: Vec3, material: Material) -> Self {
        let normal = edge_a.cross(edge_b).normalize_or_zero();
        let bbox = Aabb::enclosing(&[
            corner,
            corner + edge_a,
            corner + edge_b,
            corner + edge_a + edge_b,
        ]);

        Self {
            corner,
            edge_a,
            edge_b,
            normal,
            material,
            texture: None,
            bbox,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn intersect(&self, ray: &Ray) -> Roots {
        let denom = ray.direction.dot(self.normal);
        if denom == 0.0 {
            return Roots::NONE;
        }

        let t = (self.corner - ray.origin).dot(self.normal) / denom;
        if t < 0.0 {
            return Roots::NONE;
        }

        let unit = 0.0..=1.0;
        match self.edge_coordinates(ray.at(t)) {
            Some((alpha, beta)) if unit.contains(&alpha) && unit.contains(&beta) => Roots::one(t),
            _ => Roots::NONE,
        }
    }

    pub fn color(&self, point: Vec3) -> Color {
        let Some(texture) = &self.texture else {
            return self.material.color;
        };

        let Some((u, v)) = self.edge_coordinates(point) else {
            return self.material.color;
        };
        let (u, v) = (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
        let column = v * (texture.width as f64 - 1.0);
        let row = (1.0 - u) * (texture.height as f64 - 1.0);
        texture.texel(column, row)
    }

    /// Coordinates of an in-plane point along `edge_a` and `edge_b`, so that
    /// `point - corner = alpha * edge_a + beta * edge_b`. `None` for parallel edges.
    fn edge_coordinates(&self, point: Vec3) -> Option<(f64, f64)> {
        let d = point - self.corner;
        let aa = self.edge_a.length_squared();
        let ab = self.edge_a.dot(self.edge_b);
        let bb = self.edge_b.length_squared();
        let det = aa * bb - ab * ab;
        if det == 0.0 {
            return None;
        }

        let da = d.dot(self.edge_a);
        let db = d.dot(self.edge_b);
        Some(((bb * da - ab * db) / det, (aa * db - ab * da) / det))
    }

    /// Map a unit-square sample onto the rectangle.
    pub fn sample_point(&self, [s0, s1]: Sample) -> Vec3 {
        self.corner + self.edge_a * s0 + self.edge_b * s1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Rectangle {
        Rectangle::new(Vec3::ZERO, Vec3::Y, Vec3::X, Material::default())
    }

    #[test]
    fn test_hit_inside() {
        let rect = unit_square();
        let ray = Ray::new(Vec3::new(0.5, 0.5, 3.0), -Vec3::Z);
        let roots: Vec<f64> = rect.intersect(&ray).iter().collect();

        assert_eq!(roots, vec![3.0]);
    }

    #[test]
    fn test_miss_outside_edges() {
        let rect = unit_square();
        for (x, y) in [(1.5, 0.5), (-0.1, 0.5), (0.5, 1.01), (0.5, -0.5)] {
            let ray = Ray::new(Vec3::new(x, y, 3.0), -Vec3::Z);
            assert!(rect.intersect(&ray).is_empty(), "({}, {}) should miss", x, y);
        }
    }

    #[test]
    fn test_behind_and_parallel() {
        let rect = unit_square();
        assert!(rect.intersect(&Ray::new(Vec3::new(0.5, 0.5, 3.0), Vec3::Z)).is_empty());
        assert!(rect.intersect(&Ray::new(Vec3::new(0.5, 0.5, 3.0), Vec3::X)).is_empty());
    }

    #[test]
    fn test_skewed_bbox_covers_all_corners() {
        let rect = Rectangle::new(
            Vec3::ZERO,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Material::default(),
        );
        assert_eq!(rect.bbox.min(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(rect.bbox.max(), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_skewed_edges_reject_points_outside_parallelogram() {
        let rect = Rectangle::new(
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 0.1, 0.0),
            Material::default(),
        );

        // Projects onto both edges but lies left of the slanted side.
        let outside = Ray::new(Vec3::new(0.05, 0.05, 3.0), -Vec3::Z);
        assert!(rect.intersect(&outside).is_empty());

        let inside = Ray::new(Vec3::new(1.5, 0.05, 3.0), -Vec3::Z);
        assert_eq!(rect.intersect(&inside).len(), 1);
    }

    #[test]
    fn test_hits_stay_within_bbox() {
        let rect = Rectangle::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.5),
            Vec3::new(1.5, 0.3, 0.0),
            Material::default(),
        );
        for i in 0..40 {
            for j in 0..40 {
                let origin = Vec3::new(-2.0 + i as f64 * 0.1, 5.0, -1.0 + j as f64 * 0.075);
                let ray = Ray::new(origin, -Vec3::Y);
                if let Some(t) = rect.intersect(&ray).iter().next() {
                    let p = ray.at(t);
                    let lo = rect.bbox.min() - Vec3::splat(1e-9);
                    let hi = rect.bbox.max() + Vec3::splat(1e-9);
                    assert!(p.cmpge(lo).all() && p.cmple(hi).all(), "{:?} outside bbox", p);
                }
            }
        }
    }

    #[test]
    fn test_sample_point_lies_on_rectangle() {
        let rect = unit_square();
        let p = rect.sample_point([0.25, 0.75]);
        assert_eq!(p, Vec3::new(0.75, 0.25, 0.0));

        let ray = Ray::new(p + Vec3::Z, -Vec3::Z);
        assert_eq!(rect.intersect(&ray).len(), 1);
    }
}
