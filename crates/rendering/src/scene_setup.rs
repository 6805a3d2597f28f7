use bevy::prelude::*;

use simulation::config::CanopyConfig;
use simulation::shader_registry::ShaderRegistry;

use crate::materials::{ground_material, GroundMaterial};
use crate::shader_bindings::MaterialBindings;

/// Side length of the square ground plane.
pub const GROUND_SIZE: f32 = 3000.0;

pub const SUN_POSITION: Vec3 = Vec3::new(20.0, 100.0, 10.0);

#[derive(Component)]
pub struct Ground;

#[derive(Component)]
pub struct Sun;

pub fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(ClearColor(Color::BLACK));
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.6, 0.65, 0.7),
        brightness: 120.0,
    });
    commands.spawn((
        Sun,
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

pub fn spawn_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<GroundMaterial>>,
    mut registry: ResMut<ShaderRegistry>,
    mut bindings: ResMut<MaterialBindings>,
    config: Res<CanopyConfig>,
) {
    let material = materials.add(ground_material(&config.fog));
    let slot = bindings.bind_ground(&mut registry, material.id());
    debug!("Ground material bound to {slot:?}");

    commands.spawn((
        Ground,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(material),
        Transform::from_xyz(config.trees.middle_x(), 0.0, 0.0),
    ));
}
