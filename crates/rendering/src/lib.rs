use bevy::prelude::*;

pub mod camera;
pub mod fog_module;
pub mod materials;
pub mod scene_setup;
pub mod screenshot;
pub mod shader_bindings;
pub mod shader_composer;
pub mod tree_render;

use simulation::fog_model::FogSettings;
use simulation::frame_sets::FrameSet;

use fog_module::SceneShaders;
use materials::{GroundMaterial, TreeMaterial, GROUND_SHADER_HANDLE, TREE_SHADER_HANDLE};
use shader_bindings::MaterialBindings;
use shader_composer::ShaderComposeError;

/// Scene, materials and camera. Needs `DefaultPlugins` (for `Assets<Shader>`)
/// and `SimulationPlugin` added first.
pub struct RenderingPlugin {
    shaders: SceneShaders,
}

impl RenderingPlugin {
    pub fn new(shaders: SceneShaders) -> Self {
        Self { shaders }
    }

    pub fn from_settings(settings: &FogSettings) -> Result<Self, ShaderComposeError> {
        fog_module::compose_scene_shaders(settings).map(Self::new)
    }
}

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        match app.world_mut().get_resource_mut::<Assets<Shader>>() {
            Some(mut shaders) => {
                shaders.insert(
                    GROUND_SHADER_HANDLE.id(),
                    self.shaders.ground.clone().into_shader(),
                );
                shaders.insert(
                    TREE_SHADER_HANDLE.id(),
                    self.shaders.tree.clone().into_shader(),
                );
                info!(
                    "Registered composed shaders '{}' and '{}'",
                    self.shaders.ground.name, self.shaders.tree.name
                );
            }
            None => error!("Assets<Shader> missing; add DefaultPlugins before RenderingPlugin"),
        }

        app.add_plugins((
            MaterialPlugin::<GroundMaterial>::default(),
            MaterialPlugin::<TreeMaterial>::default(),
        ))
        .init_resource::<MaterialBindings>()
        .add_systems(
            Startup,
            (
                scene_setup::setup_lighting,
                camera::setup_camera,
                scene_setup::spawn_ground,
                tree_render::spawn_trees,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                (
                    shader_bindings::release_removed_materials,
                    shader_bindings::upload_material_uniforms,
                )
                    .chain()
                    .in_set(FrameSet::Upload),
                tree_render::apply_tree_growth.after(FrameSet::Animate),
                (
                    camera::camera_drag,
                    camera::camera_zoom,
                    camera::apply_orbit_camera,
                )
                    .chain(),
                screenshot::handle_screenshot_key,
            ),
        );
    }
}
