use std::sync::Arc;

use easyray_math::Ray;

use super::AccelerationStructure;
use crate::hit::HitPoint;
use crate::surface::Surface;

/// Exhaustive scan over every surface.
pub struct FreeObjects {
    surfaces: Arc<Vec<Surface>>,
}

impl FreeObjects {
    pub fn new(surfaces: Arc<Vec<Surface>>) -> Self {
        log::debug!("FreeObjects over {} surfaces", surfaces.len());
        Self { surfaces }
    }
}

impl AccelerationStructure for FreeObjects {
    fn nearest_hit(&self, ray: &Ray) -> HitPoint<'_> {
        let mut record = HitPoint::miss(*ray);
        for (index, surface) in self.surfaces.iter().enumerate() {
            record.consider(surface, index);
        }
        record
    }

    fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Material, Plane, Sphere};
    use easyray_math::Vec3;

    #[test]
    fn test_nearest_of_several() {
        let surfaces = Arc::new(vec![
            Surface::Sphere(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, Material::default())),
            Surface::Sphere(Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, Material::default())),
            Surface::Plane(Plane::new(Vec3::new(0.0, 0.0, -20.0), Vec3::Z, Material::default())),
        ]);
        let accel = FreeObjects::new(surfaces);
        let hit = accel.nearest_hit(&Ray::new(Vec3::ZERO, -Vec3::Z));

        assert_eq!(hit.index(), Some(1));
        assert!((hit.t() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_scene_misses() {
        let accel = FreeObjects::new(Arc::new(Vec::new()));
        assert!(!accel.nearest_hit(&Ray::new(Vec3::ZERO, Vec3::X)).is_hit());
    }
}
