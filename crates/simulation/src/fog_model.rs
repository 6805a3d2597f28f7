//! Height-attenuated exponential fog with wind-driven noise perturbation.
//!
//! These functions are the CPU reference for the fog applied in the material
//! fragment shader (`rendering/src/shaders/wind_fog.wgsl`). The shader is
//! generated from the same [`FogSettings`], so tests here pin down the
//! behaviour the GPU is expected to reproduce.
//!
//! Per fragment:
//! 1. depth is the camera→fragment distance, direction its normalized vector
//! 2. with wind enabled, depth is scaled by a domain-warped noise sample that
//!    fades to 1.0 between `falloff_start` and `falloff_start + falloff_width`
//! 3. depth is squared
//! 4. `factor = h * exp(-cam.y * d) * (1 - exp(-depth * dir.y * d)) / dir.y`,
//!    saturated to [0, 1]
//! 5. the lit color is mixed toward the fog color by `factor`

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::config_error::ConfigError;
use crate::noise::{domain_warped_fbm3, DEFAULT_OCTAVES, MAX_OCTAVES};
use crate::shader_registry::FogUniformSet;

/// Largest argument passed to `exp` before it would overflow `f32`.
const F32_EXP_LIMIT: f32 = 88.0;

/// Tunable fog parameters. Baked into the fog shader module at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogSettings {
    /// sRGB fog color, components in [0, 1].
    pub color: [f32; 3],
    /// Base exponential density of the scene fog.
    pub density: f32,
    /// Overall strength of the height-attenuated fog term.
    pub height_factor: f32,
    /// World position → noise coordinate scale.
    pub noise_scale: f32,
    /// Fog time → noise z-offset scale (how fast the fog drifts).
    pub time_scale: f32,
    /// Depth at which the noise perturbation starts fading out.
    pub falloff_start: f32,
    /// Depth span over which the perturbation fades to nothing.
    pub falloff_width: f32,
    /// fBm octave count.
    pub octaves: u32,
    /// Smallest magnitude allowed for the view direction's y component when
    /// it is used as a divisor.
    pub min_direction_y: f32,
    /// Cap on the arguments of the extinction exponentials.
    pub max_exponent: f32,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            color: srgb8(0xdf, 0xe9, 0xf3),
            density: 0.001,
            height_factor: 0.000005,
            noise_scale: 0.00025,
            time_scale: 0.0005,
            falloff_start: 5000.0,
            falloff_width: 5000.0,
            octaves: DEFAULT_OCTAVES,
            min_direction_y: 1.0e-4,
            max_exponent: 80.0,
        }
    }
}

/// 8-bit sRGB components to floats in [0, 1].
pub fn srgb8(r: u8, g: u8, b: u8) -> [f32; 3] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

impl FogSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, f32, bool); 9] = [
            ("density", self.density, self.density > 0.0),
            ("height_factor", self.height_factor, self.height_factor >= 0.0),
            ("noise_scale", self.noise_scale, self.noise_scale > 0.0),
            ("time_scale", self.time_scale, true),
            ("falloff_start", self.falloff_start, self.falloff_start >= 0.0),
            ("falloff_width", self.falloff_width, self.falloff_width > 0.0),
            ("min_direction_y", self.min_direction_y, self.min_direction_y > 0.0),
            (
                "max_exponent",
                self.max_exponent,
                self.max_exponent > 0.0 && self.max_exponent <= F32_EXP_LIMIT,
            ),
            ("octaves", self.octaves as f32, (1..=MAX_OCTAVES).contains(&self.octaves)),
        ];
        for (name, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(ConfigError::InvalidFogSetting {
                    name,
                    value: value as f64,
                });
            }
        }
        for (i, c) in self.color.iter().enumerate() {
            if !(0.0..=1.0).contains(c) {
                let name = ["color.r", "color.g", "color.b"][i];
                return Err(ConfigError::InvalidFogSetting {
                    name,
                    value: *c as f64,
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Pure fog functions
// =============================================================================

#[inline]
fn saturate(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Blend weight toward "no perturbation": 0 up to `falloff_start`, 1 from
/// `falloff_start + falloff_width` on.
pub fn perturbation_falloff(fog_depth: f32, settings: &FogSettings) -> f32 {
    saturate((fog_depth - settings.falloff_start) / settings.falloff_width)
}

/// Domain-warped noise sample remapped to [0, 1] for a world position.
pub fn wind_noise_sample(world: Vec3, fog_time: f32, settings: &FogSettings) -> f32 {
    let coord = world * settings.noise_scale + Vec3::new(0.0, 0.0, fog_time * settings.time_scale);
    domain_warped_fbm3(coord, settings.octaves) * 0.5 + 0.5
}

/// Depth multiplier from a noise sample. Exactly 1.0 once the falloff is
/// complete, so distant fog is unperturbed.
pub fn wind_perturbation(noise_sample: f32, fog_depth: f32, settings: &FogSettings) -> f32 {
    let t = perturbation_falloff(fog_depth, settings);
    noise_sample * (1.0 - t) + t
}

/// The view direction's y component made safe to divide by: magnitude at
/// least `min`, sign preserved, zero treated as positive.
pub fn fog_divisor(direction_y: f32, min: f32) -> f32 {
    if direction_y >= 0.0 {
        direction_y.max(min)
    } else {
        direction_y.min(-min)
    }
}

/// Height-attenuated fog factor in [0, 1] for an already-squared depth.
pub fn fog_factor(camera_y: f32, fog_depth_sq: f32, direction_y: f32, settings: &FogSettings) -> f32 {
    let dir_y = fog_divisor(direction_y, settings.min_direction_y);
    let limit = settings.max_exponent;
    let height_term = (-camera_y * settings.density).min(limit).exp();
    let extinction = (-fog_depth_sq * dir_y * settings.density).min(limit).exp();
    let factor = settings.height_factor * height_term * (1.0 - extinction) / dir_y;
    if factor.is_nan() {
        return 0.0;
    }
    saturate(factor)
}

/// Full per-fragment evaluation: the fog factor for a fragment at `world`
/// seen from `camera` under the current uniform values.
pub fn evaluate_fog(world: Vec3, camera: Vec3, uniforms: &FogUniformSet, settings: &FogSettings) -> f32 {
    let offset = world - camera;
    let direction = offset.normalize_or_zero();
    let mut fog_depth = offset.length();
    if uniforms.wind_enabled {
        let sample = wind_noise_sample(world, uniforms.fog_time as f32, settings);
        fog_depth *= wind_perturbation(sample, fog_depth, settings);
    }
    fog_depth *= fog_depth;
    fog_factor(camera.y, fog_depth, direction.y, settings)
}

/// Mix a lit color toward the fog color.
pub fn apply_fog(color: Vec3, fog_color: Vec3, factor: f32) -> Vec3 {
    let t = saturate(factor);
    color * (1.0 - t) + fog_color * t
}
