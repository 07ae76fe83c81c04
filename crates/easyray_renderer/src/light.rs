use easyray_core::PointLightDescription;
use easyray_math::{Color, Vec3};

/// An infinitely small light at a fixed location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub location: Vec3,
    pub color: Color,
}

impl PointLight {
    pub fn new(location: Vec3, color: Color) -> Self {
        Self { location, color }
    }
}

impl From<&PointLightDescription> for PointLight {
    fn from(desc: &PointLightDescription) -> Self {
        Self::new(desc.location, desc.color)
    }
}
