//! Point-light collection for the Blinn-Phong pass.
//!
//! The custom material takes fixed-size light arrays, so every frame the
//! scene's lights are packed into `[Vec4; MAX_POINT_LIGHTS]` buffers. When the
//! scene holds more lights than fit, the arrays truncate but the reported
//! count stays at the raw scene total, so the overflow is visible to anything
//! reading it back.

use bevy::prelude::*;

/// Hard cap on lights the shader arrays can hold.
pub const MAX_POINT_LIGHTS: usize = 256;

/// Marks a `PointLight` entity as a source for the Blinn-Phong pass, with the
/// linear-space color the pass should use for it.
#[derive(Component, Clone, Copy, Debug)]
pub struct BlinnPhongLight {
    pub color: Vec3,
}

impl Default for BlinnPhongLight {
    fn default() -> Self {
        BlinnPhongLight { color: Vec3::ONE }
    }
}

/// One light as gathered from the scene, before packing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLightSource {
    pub position: Vec3,
    pub color: Vec3,
}

/// Fixed-size light buffers ready for upload.
#[derive(Clone, Debug)]
pub struct PackedLights {
    pub positions: [Vec4; MAX_POINT_LIGHTS],
    pub colors: [Vec4; MAX_POINT_LIGHTS],
    /// Raw scene light count, NOT clamped to the array length.
    pub count: u32,
}

impl Default for PackedLights {
    fn default() -> Self {
        PackedLights {
            positions: [Vec4::ZERO; MAX_POINT_LIGHTS],
            colors: [Vec4::ZERO; MAX_POINT_LIGHTS],
            count: 0,
        }
    }
}

/// Whether a scene light count is at or past the array cap. The warning
/// already fires when the arrays are merely full, before anything is dropped.
#[must_use]
pub fn light_cap_reached(len: usize) -> bool {
    len >= MAX_POINT_LIGHTS
}

/// Pack scene lights into the fixed arrays. Slots past the light count stay
/// zeroed; lights past the cap are dropped with a warning, but `count` keeps
/// the raw length.
#[must_use]
pub fn pack_point_lights(sources: &[PointLightSource]) -> PackedLights {
    if light_cap_reached(sources.len()) {
        warn!(
            "scene has {} point lights, cap is {}; lights past the cap are not uploaded",
            sources.len(),
            MAX_POINT_LIGHTS
        );
    }
    let mut packed = PackedLights {
        count: sources.len() as u32,
        ..PackedLights::default()
    };
    for (i, source) in sources.iter().take(MAX_POINT_LIGHTS).enumerate() {
        packed.positions[i] = source.position.extend(1.0);
        packed.colors[i] = source.color.extend(1.0);
    }
    packed
}
