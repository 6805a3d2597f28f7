//! WGSL modules fed into the material template.
//!
//! [`FogModule`] bakes [`FogSettings`] into `const` declarations and adds the
//! noise and fog functions plus the post-lighting fog blend.
//! [`GradientModule`] replaces the base color of tree materials with the
//! pollution gradient. [`compose_scene_shaders`] builds both programs used by
//! the scene.

use simulation::fog_model::FogSettings;

use crate::shader_composer::{ComposedShader, ShaderComposeError, ShaderComposer, ShaderTemplate};

const MATERIAL_FRAGMENT: &str = include_str!("shaders/material_fragment.wgsl");
const SIMPLEX_NOISE: &str = include_str!("shaders/simplex_noise.wgsl");
const WIND_FOG: &str = include_str!("shaders/wind_fog.wgsl");
const WIND_FOG_BINDINGS: &str = include_str!("shaders/wind_fog_bindings.wgsl");
const TREE_GRADIENT: &str = include_str!("shaders/tree_gradient.wgsl");

const FOG_POST_LIGHTING: &str = "    out.color = vec4<f32>(apply_wind_fog(out.color.rgb, in.world_position.xyz, view.world_position), out.color.a);";
const GRADIENT_BASE_COLOR: &str = "    pbr_input.material.base_color = vec4<f32>(tree_gradient_color(), pbr_input.material.base_color.a);";

pub const GROUND_SHADER: &str = "ground_fragment";
pub const TREE_SHADER: &str = "tree_fragment";

/// Render a finite `f32` as a WGSL float literal.
pub fn wgsl_f32(value: f32) -> String {
    let text = format!("{value:?}");
    if text.contains('.') || text.contains('e') {
        text
    } else {
        format!("{text}.0")
    }
}

pub fn material_template(name: &str) -> ShaderTemplate {
    ShaderTemplate::new(name, MATERIAL_FRAGMENT)
}

// =============================================================================
// Fog
// =============================================================================

#[derive(Debug, Clone)]
pub struct FogModule {
    settings: FogSettings,
}

impl FogModule {
    pub const NAME: &'static str = "wind_fog";

    pub fn new(settings: &FogSettings) -> Result<Self, ShaderComposeError> {
        settings
            .validate()
            .map_err(|err| ShaderComposeError::InvalidModule {
                module: Self::NAME.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            settings: settings.clone(),
        })
    }

    pub fn settings(&self) -> &FogSettings {
        &self.settings
    }

    /// `const` block the noise and fog functions read.
    pub fn constants(&self) -> String {
        let s = &self.settings;
        let floats = [
            ("FOG_HEIGHT_FACTOR", s.height_factor),
            ("FOG_NOISE_SCALE", s.noise_scale),
            ("FOG_TIME_SCALE", s.time_scale),
            ("FOG_FALLOFF_START", s.falloff_start),
            ("FOG_FALLOFF_WIDTH", s.falloff_width),
            ("FOG_MIN_DIRECTION_Y", s.min_direction_y),
            ("FOG_MAX_EXPONENT", s.max_exponent),
        ];
        let mut out = format!("const FOG_OCTAVES: u32 = {}u;\n", s.octaves);
        for (name, value) in floats {
            out.push_str(&format!("const {name}: f32 = {};\n", wgsl_f32(value)));
        }
        out
    }

    pub fn install(&self, composer: &mut ShaderComposer<'_>) -> Result<(), ShaderComposeError> {
        composer.insert("bindings", WIND_FOG_BINDINGS)?;
        composer.insert("functions", self.constants())?;
        composer.insert("functions", SIMPLEX_NOISE)?;
        composer.insert("functions", WIND_FOG)?;
        composer.insert("post_lighting", FOG_POST_LIGHTING)?;
        Ok(())
    }
}

// =============================================================================
// Gradient
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct GradientModule;

impl GradientModule {
    pub fn install(&self, composer: &mut ShaderComposer<'_>) -> Result<(), ShaderComposeError> {
        composer.insert("bindings", TREE_GRADIENT)?;
        composer.insert("base_color", GRADIENT_BASE_COLOR)?;
        Ok(())
    }
}

// =============================================================================
// Scene programs
// =============================================================================

/// Both fragment programs the scene uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneShaders {
    pub ground: ComposedShader,
    pub tree: ComposedShader,
}

pub fn compose_scene_shaders(settings: &FogSettings) -> Result<SceneShaders, ShaderComposeError> {
    let fog = FogModule::new(settings)?;

    let ground_template = material_template(GROUND_SHADER);
    let mut ground = ShaderComposer::new(&ground_template);
    fog.install(&mut ground)?;
    ground.skip("base_color")?;

    let tree_template = material_template(TREE_SHADER);
    let mut tree = ShaderComposer::new(&tree_template);
    fog.install(&mut tree)?;
    GradientModule.install(&mut tree)?;

    Ok(SceneShaders {
        ground: ground.compose()?,
        tree: tree.compose()?,
    })
}
