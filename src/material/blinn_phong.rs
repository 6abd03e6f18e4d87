//! Blinn-Phong material extension.
//!
//! Extends `StandardMaterial` with a single large uniform carrying the packed
//! point-light arrays and the scalar shading coefficients. The binding index
//! is fixed via the attribute so the shader can rely on a stable slot; do not
//! change it without updating `shaders/blinn_phong.wgsl`.

use bevy::asset::Asset;
use bevy::pbr::{ExtendedMaterial, MaterialExtension, StandardMaterial};
use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderRef, ShaderType};

use crate::lighting::{pack_point_lights, BlinnPhongLight, PointLightSource, MAX_POINT_LIGHTS};
use crate::settings::Settings;

/// Uniform block uploaded to the fragment shader each frame.
///
/// `light_count` is the raw scene count and may exceed the array length; the
/// shader clamps its loop bound, the CPU side keeps the honest number.
#[derive(ShaderType, Clone, Copy, Debug)]
pub struct BlinnPhongUniform {
    pub light_positions: [Vec4; MAX_POINT_LIGHTS],
    pub light_colors: [Vec4; MAX_POINT_LIGHTS],
    pub light_count: u32,
    pub ambient_albedo: f32,
    pub diffuse_albedo: f32,
    pub specular_albedo: f32,
    pub attenuation_factor: f32,
    pub specular_exponent: f32,
}

impl Default for BlinnPhongUniform {
    fn default() -> Self {
        BlinnPhongUniform {
            light_positions: [Vec4::ZERO; MAX_POINT_LIGHTS],
            light_colors: [Vec4::ZERO; MAX_POINT_LIGHTS],
            light_count: 0,
            ambient_albedo: 1.0,
            diffuse_albedo: 1.0,
            specular_albedo: 1.0,
            attenuation_factor: 1.0,
            specular_exponent: 25.0,
        }
    }
}

/// Material used for rendering level geometry with per-scene point lights.
#[derive(AsBindGroup, Asset, TypePath, Clone, Default)]
pub struct BlinnPhongMaterial {
    #[uniform(100)]
    pub lighting: BlinnPhongUniform,
}

impl MaterialExtension for BlinnPhongMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/blinn_phong.wgsl".into()
    }
}

pub type BlinnPhongExtended = ExtendedMaterial<StandardMaterial, BlinnPhongMaterial>;

/// Handle to the one shared material instance the level geometry uses.
#[derive(Resource)]
pub struct BlinnPhongMaterialHandle(pub Handle<BlinnPhongExtended>);

/// Gather scene lights, pack them and write the shared material's uniform,
/// along with the current shading coefficients from settings.
#[allow(clippy::needless_pass_by_value)]
pub fn upload_point_lights(
    settings: Res<Settings>,
    lights: Query<(&GlobalTransform, &BlinnPhongLight)>,
    material_handle: Option<Res<BlinnPhongMaterialHandle>>,
    mut materials: Option<ResMut<Assets<BlinnPhongExtended>>>,
) {
    let (Some(handle), Some(materials)) = (material_handle, materials.as_mut()) else {
        return;
    };
    let Some(material) = materials.get_mut(&handle.0) else {
        return;
    };

    let sources: Vec<PointLightSource> = lights
        .iter()
        .map(|(transform, light)| PointLightSource {
            position: transform.translation(),
            color: light.color,
        })
        .collect();
    let packed = pack_point_lights(&sources);

    let uniform = &mut material.extension.lighting;
    uniform.light_positions = packed.positions;
    uniform.light_colors = packed.colors;
    uniform.light_count = packed.count;
    uniform.ambient_albedo = settings.lighting.ambient_albedo;
    uniform.diffuse_albedo = settings.lighting.diffuse_albedo;
    uniform.specular_albedo = settings.lighting.specular_albedo;
    uniform.attenuation_factor = settings.lighting.attenuation_factor;
    uniform.specular_exponent = settings.lighting.specular_exponent;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_defaults_match_settings_defaults() {
        let uniform = BlinnPhongUniform::default();
        let lighting = crate::settings::LightingSettings::default();
        assert_eq!(uniform.ambient_albedo, lighting.ambient_albedo);
        assert_eq!(uniform.diffuse_albedo, lighting.diffuse_albedo);
        assert_eq!(uniform.specular_albedo, lighting.specular_albedo);
        assert_eq!(uniform.attenuation_factor, lighting.attenuation_factor);
        assert_eq!(uniform.specular_exponent, lighting.specular_exponent);
        assert_eq!(uniform.light_count, 0);
    }
}
