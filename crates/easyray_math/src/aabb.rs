use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box used by the acceleration structures.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// A box whose min equals its max on every axis is *degenerate*: unbounded
/// surfaces such as planes report it so the regular grid keeps them out of
/// its cells.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));
        Self { x, y, z }
    }

    /// Smallest box holding every point. Empty for an empty slice.
    pub fn enclosing(points: &[Vec3]) -> Self {
        points.iter().fold(Aabb::EMPTY, |acc, p| {
            Aabb::surrounding(&acc, &Aabb::from_points(*p, *p))
        })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Per-axis width of the box.
    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.x.size(), self.y.size(), self.z.size())
    }

    /// True when min == max on all three axes (the "unbounded" sentinel).
    pub fn is_degenerate(&self) -> bool {
        self.min() == self.max()
    }

    /// Point containment on the half-open box [min, max) per axis.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains_half_open(p.x)
            && self.y.contains_half_open(p.y)
            && self.z.contains_half_open(p.z)
    }

    /// Intersect a ray with this box using the slab method.
    ///
    /// Returns the entry/exit parameters along the ray, or `None` when the
    /// slabs do not overlap or the box lies entirely behind `epsilon`.
    /// The entry parameter may be negative when the origin is inside.
    pub fn slab(&self, ray: &Ray, epsilon: f64) -> Option<Interval> {
        let mut ray_t = Interval::UNIVERSE;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let orig = ray.origin[axis];
            let dir = ray.direction[axis];

            if dir == 0.0 {
                // Parallel to this slab: either always inside it or never.
                if orig < slab.min || orig > slab.max {
                    return None;
                }
                continue;
            }

            let adinv = 1.0 / dir;
            let mut t0 = (slab.min - orig) * adinv;
            let mut t1 = (slab.max - orig) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t = ray_t.intersect(&Interval::new(t0, t1));
        }

        if ray_t.min >= ray_t.max || ray_t.max <= epsilon {
            return None;
        }
        Some(ray_t)
    }

    /// Pad intervals narrower than `delta` so the box has volume.
    pub fn pad_to_minimums(&self, delta: f64) -> Aabb {
        let pad = |i: Interval| if i.size() < delta { i.expand(delta) } else { i };
        Aabb::new(pad(self.x), pad(self.y), pad(self.z))
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const DEGENERATE: Aabb = Aabb {
        x: Interval { min: 0.0, max: 0.0 },
        y: Interval { min: 0.0, max: 0.0 },
        z: Interval { min: 0.0, max: 0.0 },
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let a = Vec3::new(10.0, 0.0, 10.0);
        let b = Vec3::new(0.0, 10.0, 0.0);
        let aabb = Aabb::from_points(a, b);

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.x.min, 0.0);
        assert_eq!(surrounding.x.max, 10.0);
    }

    #[test]
    fn test_aabb_enclosing() {
        let aabb = Aabb::enclosing(&[
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(3.0, -2.0, 1.0),
            Vec3::new(0.0, 0.0, -4.0),
        ]);
        assert_eq!(aabb.min(), Vec3::new(-1.0, -2.0, -4.0));
        assert_eq!(aabb.max(), Vec3::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_degenerate_sentinel() {
        assert!(Aabb::DEGENERATE.is_degenerate());
        assert!(Aabb::from_points(Vec3::ONE, Vec3::ONE).is_degenerate());

        // Flat on one axis is still a real box.
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        assert!(!flat.is_degenerate());
    }

    #[test]
    fn test_contains_point_half_open() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::splat(2.0));

        assert!(aabb.contains_point(Vec3::splat(1.0)));
        assert!(aabb.contains_point(Vec3::ZERO));
        assert!(aabb.contains_point(Vec3::new(1.999, 0.5, 0.5)));

        // Max boundary is excluded on every axis.
        assert!(!aabb.contains_point(Vec3::new(2.0, 1.0, 1.0)));
        assert!(!aabb.contains_point(Vec3::new(1.0, 2.0, 1.0)));
        assert!(!aabb.contains_point(Vec3::new(1.0, 1.0, 2.0)));
        assert!(!aabb.contains_point(Vec3::new(-0.1, 1.0, 1.0)));
    }

    #[test]
    fn test_aabb_slab() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let t = aabb.slab(&ray, 1e-4).unwrap();
        assert!((t.min - 4.0).abs() < 1e-12);
        assert!((t.max - 6.0).abs() < 1e-12);

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.slab(&ray, 1e-4).is_none());

        // Ray missing the box, parallel to two slabs
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.slab(&ray, 1e-4).is_none());
    }

    #[test]
    fn test_aabb_slab_from_inside() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::splat(4.0));
        let ray = Ray::new(Vec3::splat(2.0), Vec3::X);
        let t = aabb.slab(&ray, 1e-4).unwrap();

        assert!(t.min < 0.0);
        assert!((t.max - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pad_to_minimums() {
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let padded = flat.pad_to_minimums(0.001);

        assert_eq!(padded.x, flat.x);
        assert!((padded.z.size() - 0.001).abs() < 1e-12);
        assert!(padded.z.min < 0.0 && padded.z.max > 0.0);
    }
}
