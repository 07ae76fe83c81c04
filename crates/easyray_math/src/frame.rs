use crate::Vec3;

/// Orthonormal basis built around a primary axis `w`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Frame {
    /// Build a frame whose `w` axis is `axis` (normalized).
    ///
    /// `u` is taken perpendicular to both `w` and the (1,1,1) diagonal, falling
    /// back to (1,1,2) when `w` lies on that diagonal.
    pub fn around(axis: Vec3) -> Self {
        let w = axis.normalize();
        let mut u = w.cross(Vec3::ONE);
        if u.length_squared() == 0.0 {
            u = w.cross(Vec3::new(1.0, 1.0, 2.0));
        }
        let u = u.normalize();
        let v = w.cross(u).normalize();
        Self { u, v, w }
    }

    /// Express a local (u, v, w) direction in world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.u * local.x + self.v * local.y + self.w * local.z
    }
}
