//! Material extensions carrying the fog and gradient uniform blocks.
//!
//! Both extend `StandardMaterial`, so lighting and shadows stay Bevy's; only
//! the fragment stage is swapped for a composed program (see `fog_module`).

use bevy::pbr::{ExtendedMaterial, MaterialExtension};
use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderRef, ShaderType};

use simulation::fog_model::FogSettings;
use simulation::shader_registry::{ColorGradientUniformSet, ColorStops, FogUniformSet};

pub const GROUND_SHADER_HANDLE: Handle<Shader> =
    Handle::weak_from_u128(0x3f1c_9a0e_57d2_4b8e_a6c1_02d7_e4b9_1f60);
pub const TREE_SHADER_HANDLE: Handle<Shader> =
    Handle::weak_from_u128(0x8b24_d3f7_1e09_4c5a_9f3b_6e18_c0a2_7d95);

pub type GroundMaterial = ExtendedMaterial<StandardMaterial, FogShaderExtension>;
pub type TreeMaterial = ExtendedMaterial<StandardMaterial, TreeShaderExtension>;

// =============================================================================
// Uniform blocks
// =============================================================================

/// GPU layout of `WindFog` in `wind_fog_bindings.wgsl`.
#[derive(ShaderType, Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct WindFogUniforms {
    /// Linear RGB, alpha unused.
    pub fog_color: Vec4,
    pub fog_time: f32,
    /// Carried for shaders that want it; the current fog does not read it.
    pub wind_intensity: f32,
    pub fog_density: f32,
    pub wind_enabled: u32,
}

impl WindFogUniforms {
    pub fn from_settings(settings: &FogSettings) -> Self {
        let [r, g, b] = settings.color;
        let linear = Color::srgb(r, g, b).to_linear();
        Self {
            fog_color: Vec4::new(linear.red, linear.green, linear.blue, 1.0),
            fog_time: 0.0,
            wind_intensity: 0.0,
            fog_density: settings.density,
            wind_enabled: 1,
        }
    }

    /// Copy a registry uniform set in. Returns whether anything changed.
    pub fn apply(&mut self, set: &FogUniformSet) -> bool {
        let next = Self {
            fog_time: set.fog_time as f32,
            wind_intensity: set.wind_intensity as f32,
            wind_enabled: u32::from(set.wind_enabled),
            ..*self
        };
        let changed = next != *self;
        *self = next;
        changed
    }
}

/// GPU layout of `TreeGradient` in `tree_gradient.wgsl`. Stops stay sRGB;
/// the shader converts after mixing so it matches `ColorStops::sample`.
#[derive(ShaderType, Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct GradientUniforms {
    pub color_low: Vec4,
    pub color_mid: Vec4,
    pub color_high: Vec4,
    pub gradient_factor: f32,
}

fn stop(c: [f32; 3]) -> Vec4 {
    Vec4::new(c[0], c[1], c[2], 1.0)
}

impl GradientUniforms {
    pub fn from_stops(stops: &ColorStops) -> Self {
        Self {
            color_low: stop(stops.low),
            color_mid: stop(stops.mid),
            color_high: stop(stops.high),
            gradient_factor: 0.0,
        }
    }

    pub fn apply(&mut self, set: &ColorGradientUniformSet) -> bool {
        let next = Self {
            gradient_factor: set.gradient_factor as f32,
            ..Self::from_stops(&set.stops)
        };
        let changed = next != *self;
        *self = next;
        changed
    }
}

// =============================================================================
// Extensions
// =============================================================================

#[derive(Asset, AsBindGroup, Reflect, Debug, Clone)]
pub struct FogShaderExtension {
    #[uniform(100)]
    pub fog: WindFogUniforms,
}

impl MaterialExtension for FogShaderExtension {
    fn fragment_shader() -> ShaderRef {
        GROUND_SHADER_HANDLE.into()
    }
}

#[derive(Asset, AsBindGroup, Reflect, Debug, Clone)]
pub struct TreeShaderExtension {
    #[uniform(100)]
    pub fog: WindFogUniforms,
    #[uniform(101)]
    pub gradient: GradientUniforms,
}

impl MaterialExtension for TreeShaderExtension {
    fn fragment_shader() -> ShaderRef {
        TREE_SHADER_HANDLE.into()
    }
}

pub fn ground_material(settings: &FogSettings) -> GroundMaterial {
    ExtendedMaterial {
        base: StandardMaterial {
            base_color: Color::BLACK,
            perceptual_roughness: 1.0,
            ..default()
        },
        extension: FogShaderExtension {
            fog: WindFogUniforms::from_settings(settings),
        },
    }
}

pub fn tree_material(settings: &FogSettings, stops: &ColorStops) -> TreeMaterial {
    ExtendedMaterial {
        base: StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.8,
            ..default()
        },
        extension: TreeShaderExtension {
            fog: WindFogUniforms::from_settings(settings),
            gradient: GradientUniforms::from_stops(stops),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_sizes_match_wgsl() {
        assert_eq!(WindFogUniforms::min_size().get(), 32);
        assert_eq!(GradientUniforms::min_size().get(), 64);
    }

    #[test]
    fn test_fog_color_converted_to_linear() {
        let settings = FogSettings {
            color: [1.0, 0.5, 0.0],
            ..Default::default()
        };
        let u = WindFogUniforms::from_settings(&settings);
        assert!((u.fog_color.x - 1.0).abs() < 1e-6);
        assert!(u.fog_color.y > 0.2 && u.fog_color.y < 0.22, "got {}", u.fog_color.y);
        assert_eq!(u.fog_color.z, 0.0);
        assert_eq!(u.fog_density, settings.density);
    }

    #[test]
    fn test_apply_fog_set() {
        let mut u = WindFogUniforms::from_settings(&FogSettings::default());
        let set = FogUniformSet {
            wind_enabled: false,
            fog_time: 12.5,
            wind_intensity: 0.003,
        };
        assert!(u.apply(&set));
        assert_eq!(u.fog_time, 12.5);
        assert_eq!(u.wind_enabled, 0);
        assert!((u.wind_intensity - 0.003).abs() < 1e-9);
        assert!(!u.apply(&set), "second apply of the same set is a no-op");
    }

    #[test]
    fn test_apply_keeps_color_and_density() {
        let settings = FogSettings::default();
        let mut u = WindFogUniforms::from_settings(&settings);
        let before = u;
        u.apply(&FogUniformSet::default());
        assert_eq!(u.fog_color, before.fog_color);
        assert_eq!(u.fog_density, before.fog_density);
    }

    #[test]
    fn test_gradient_apply() {
        let stops = ColorStops::default();
        let mut u = GradientUniforms::from_stops(&stops);
        assert_eq!(u.gradient_factor, 0.0);
        let mut set = ColorGradientUniformSet::new(stops);
        set.gradient_factor = 0.25;
        assert!(u.apply(&set));
        assert_eq!(u.gradient_factor, 0.25);
        assert_eq!(u.color_low, Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert!(!u.apply(&set));
    }

    #[test]
    fn test_ground_material_is_black_base() {
        let m = ground_material(&FogSettings::default());
        assert_eq!(m.base.base_color, Color::BLACK);
        assert_eq!(m.extension.fog.wind_enabled, 1);
    }
}
