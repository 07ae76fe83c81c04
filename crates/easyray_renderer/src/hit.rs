//! Nearest-hit records.

use easyray_math::{Ray, Vec3};

use crate::surface::Surface;

/// A confirmed intersection.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub surface: &'a Surface,
    /// Position of `surface` in the scene's surface list
    pub index: usize,
    pub t: f64,
    pub point: Vec3,
}

/// Result of a nearest-hit query: the originating ray and, if anything was
/// struck, the closest hit.
///
/// While a query runs the record only ever tightens: a candidate replaces
/// the current hit only when it is strictly closer.
#[derive(Debug, Clone, Copy)]
pub struct HitPoint<'a> {
    pub ray: Ray,
    hit: Option<Hit<'a>>,
}

impl<'a> HitPoint<'a> {
    /// An empty record for `ray`.
    pub fn miss(ray: Ray) -> Self {
        Self { ray, hit: None }
    }

    /// Offer every root of `surface` as a candidate.
    pub fn consider(&mut self, surface: &'a Surface, index: usize) {
        for t in surface.intersect(&self.ray).iter() {
            self.offer(surface, index, t);
        }
    }

    /// Keep `t` if it is strictly positive and closer than the current hit.
    pub fn offer(&mut self, surface: &'a Surface, index: usize, t: f64) -> bool {
        if !(t > 0.0) || t >= self.t() {
            return false;
        }
        self.hit = Some(Hit {
            surface,
            index,
            t,
            point: self.ray.at(t),
        });
        true
    }

    /// Keep whichever of `self` and `other` is closer.
    pub fn closer(self, other: HitPoint<'a>) -> HitPoint<'a> {
        if other.t() < self.t() {
            other
        } else {
            self
        }
    }

    /// Distance to the hit, infinite on a miss.
    pub fn t(&self) -> f64 {
        self.hit.map_or(f64::INFINITY, |h| h.t)
    }

    pub fn hit(&self) -> Option<&Hit<'a>> {
        self.hit.as_ref()
    }

    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.hit.map(|h| h.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Material, Sphere};

    #[test]
    fn test_best_hit_only_tightens() {
        let surface = Surface::Sphere(Sphere::new(Vec3::ZERO, 1.0, Material::default()));
        let mut record = HitPoint::miss(Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z));
        assert!(!record.is_hit());
        assert_eq!(record.t(), f64::INFINITY);

        assert!(record.offer(&surface, 0, 6.0));
        assert!(record.offer(&surface, 1, 4.0));
        assert!(!record.offer(&surface, 2, 5.0));
        assert!(!record.offer(&surface, 3, 4.0));

        assert_eq!(record.index(), Some(1));
        assert_eq!(record.hit().unwrap().point, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        let surface = Surface::Sphere(Sphere::new(Vec3::ZERO, 1.0, Material::default()));
        let mut record = HitPoint::miss(Ray::new(Vec3::ZERO, Vec3::Z));

        assert!(!record.offer(&surface, 0, 0.0));
        assert!(!record.offer(&surface, 0, -1.0));
        assert!(!record.offer(&surface, 0, f64::NAN));

        // From inside the sphere only the far root counts
        record.consider(&surface, 0);
        assert!((record.t() - 1.0).abs() < 1e-12);
    }
}
