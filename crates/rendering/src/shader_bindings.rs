//! Links registry slots to material assets.
//!
//! Each fog-shaded material owns one `FogSlot`; tree materials also point at
//! their `TreeSlot`. Once per frame, after the broadcast, the registry's
//! uniform sets are copied into the material assets. When a material asset is
//! dropped its fog slot is released.

use bevy::prelude::*;

use simulation::shader_registry::{FogSlot, ShaderRegistry, TreeSlot};

use crate::materials::{GroundMaterial, TreeMaterial};

#[derive(Debug, Clone, Copy, PartialEq)]
struct GroundBinding {
    fog: FogSlot,
    material: AssetId<GroundMaterial>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TreeBinding {
    fog: FogSlot,
    tree: TreeSlot,
    material: AssetId<TreeMaterial>,
}

#[derive(Resource, Debug, Default)]
pub struct MaterialBindings {
    ground: Vec<GroundBinding>,
    trees: Vec<TreeBinding>,
}

impl MaterialBindings {
    pub fn bind_ground(
        &mut self,
        registry: &mut ShaderRegistry,
        material: AssetId<GroundMaterial>,
    ) -> FogSlot {
        let fog = registry.register_fog();
        self.ground.push(GroundBinding { fog, material });
        fog
    }

    pub fn bind_tree(
        &mut self,
        registry: &mut ShaderRegistry,
        tree: TreeSlot,
        material: AssetId<TreeMaterial>,
    ) -> FogSlot {
        let fog = registry.register_fog();
        self.trees.push(TreeBinding {
            fog,
            tree,
            material,
        });
        fog
    }

    pub fn unbind_ground(
        &mut self,
        registry: &mut ShaderRegistry,
        material: AssetId<GroundMaterial>,
    ) -> bool {
        let Some(pos) = self.ground.iter().position(|b| b.material == material) else {
            return false;
        };
        let binding = self.ground.swap_remove(pos);
        registry.release_fog(binding.fog)
    }

    pub fn unbind_tree(
        &mut self,
        registry: &mut ShaderRegistry,
        material: AssetId<TreeMaterial>,
    ) -> bool {
        let Some(pos) = self.trees.iter().position(|b| b.material == material) else {
            return false;
        };
        let binding = self.trees.swap_remove(pos);
        registry.release_fog(binding.fog)
    }

    pub fn len(&self) -> usize {
        self.ground.len() + self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Copy uniform sets into material assets. Materials are only touched when
/// a value differs, so unchanged ones keep their prepared bind groups.
pub fn upload_material_uniforms(
    registry: Res<ShaderRegistry>,
    bindings: Res<MaterialBindings>,
    mut grounds: ResMut<Assets<GroundMaterial>>,
    mut trees: ResMut<Assets<TreeMaterial>>,
) {
    for binding in &bindings.ground {
        let (Some(set), Some(material)) = (registry.fog(binding.fog), grounds.get(binding.material))
        else {
            continue;
        };
        let mut fog = material.extension.fog;
        if fog.apply(set) {
            if let Some(material) = grounds.get_mut(binding.material) {
                material.extension.fog = fog;
            }
        }
    }

    for binding in &bindings.trees {
        let Some(material) = trees.get(binding.material) else {
            continue;
        };
        let mut fog = material.extension.fog;
        let mut gradient = material.extension.gradient;
        let mut changed = registry.fog(binding.fog).is_some_and(|set| fog.apply(set));
        if let Some(color) = registry.color(binding.tree) {
            changed |= gradient.apply(color);
        }
        if changed {
            if let Some(material) = trees.get_mut(binding.material) {
                material.extension.fog = fog;
                material.extension.gradient = gradient;
            }
        }
    }
}

pub fn release_removed_materials(
    mut ground_events: EventReader<AssetEvent<GroundMaterial>>,
    mut tree_events: EventReader<AssetEvent<TreeMaterial>>,
    mut bindings: ResMut<MaterialBindings>,
    mut registry: ResMut<ShaderRegistry>,
) {
    for event in ground_events.read() {
        if let AssetEvent::Removed { id } = event {
            if bindings.unbind_ground(&mut registry, *id) {
                debug!("Released fog slot of ground material {id:?}");
            }
        }
    }
    for event in tree_events.read() {
        if let AssetEvent::Removed { id } = event {
            if bindings.unbind_tree(&mut registry, *id) {
                debug!("Released fog slot of tree material {id:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{ground_material, tree_material};
    use simulation::fog_model::FogSettings;
    use simulation::shader_registry::{ColorStops, FogUniformSet};

    fn test_app() -> App {
        let mut app = App::new();
        app.insert_resource(Assets::<GroundMaterial>::default())
            .insert_resource(Assets::<TreeMaterial>::default())
            .init_resource::<ShaderRegistry>()
            .init_resource::<MaterialBindings>()
            .add_event::<AssetEvent<GroundMaterial>>()
            .add_event::<AssetEvent<TreeMaterial>>()
            .add_systems(
                Update,
                (release_removed_materials, upload_material_uniforms).chain(),
            );
        app
    }

    fn add_ground(app: &mut App) -> (AssetId<GroundMaterial>, FogSlot) {
        let world = app.world_mut();
        let id = world
            .resource_mut::<Assets<GroundMaterial>>()
            .add(ground_material(&FogSettings::default()))
            .id();
        let slot = world.resource_scope(|world, mut registry: Mut<ShaderRegistry>| {
            world
                .resource_mut::<MaterialBindings>()
                .bind_ground(&mut registry, id)
        });
        (id, slot)
    }

    fn add_tree(app: &mut App, tree: TreeSlot) -> AssetId<TreeMaterial> {
        let world = app.world_mut();
        let stops = ColorStops::default();
        world
            .resource_mut::<ShaderRegistry>()
            .register_color(tree.index(), stops)
            .unwrap();
        let id = world
            .resource_mut::<Assets<TreeMaterial>>()
            .add(tree_material(&FogSettings::default(), &stops))
            .id();
        world.resource_scope(|world, mut registry: Mut<ShaderRegistry>| {
            world
                .resource_mut::<MaterialBindings>()
                .bind_tree(&mut registry, tree, id);
        });
        id
    }

    fn broadcast(app: &mut App, fog_time: f64) {
        app.world_mut()
            .resource_mut::<ShaderRegistry>()
            .broadcast_fog(&FogUniformSet {
                wind_enabled: true,
                fog_time,
                wind_intensity: 0.01,
            });
    }

    #[test]
    fn test_ground_material_receives_fog_time() {
        let mut app = test_app();
        let (id, _) = add_ground(&mut app);
        broadcast(&mut app, 42.0);
        app.update();
        let assets = app.world().resource::<Assets<GroundMaterial>>();
        let fog = assets.get(id).unwrap().extension.fog;
        assert_eq!(fog.fog_time, 42.0);
        assert!((fog.wind_intensity - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_tree_material_receives_gradient() {
        let mut app = test_app();
        let tree = TreeSlot::ALL[2];
        let id = add_tree(&mut app, tree);
        app.world_mut()
            .resource_mut::<ShaderRegistry>()
            .set_gradient_factor(tree, 0.3);
        broadcast(&mut app, 7.0);
        app.update();
        let assets = app.world().resource::<Assets<TreeMaterial>>();
        let ext = &assets.get(id).unwrap().extension;
        assert!((ext.gradient.gradient_factor - 0.3).abs() < 1e-6);
        assert_eq!(ext.fog.fog_time, 7.0);
    }

    #[test]
    fn test_every_bound_material_sees_same_time() {
        let mut app = test_app();
        let ids: Vec<_> = (0..3).map(|_| add_ground(&mut app).0).collect();
        let tree = add_tree(&mut app, TreeSlot::ALL[0]);
        broadcast(&mut app, 99.0);
        app.update();
        let grounds = app.world().resource::<Assets<GroundMaterial>>();
        for id in ids {
            assert_eq!(grounds.get(id).unwrap().extension.fog.fog_time, 99.0);
        }
        let trees = app.world().resource::<Assets<TreeMaterial>>();
        assert_eq!(trees.get(tree).unwrap().extension.fog.fog_time, 99.0);
    }

    #[test]
    fn test_removed_material_releases_fog_slot() {
        let mut app = test_app();
        let (id, slot) = add_ground(&mut app);
        let (_, other) = add_ground(&mut app);
        app.world_mut().send_event(AssetEvent::Removed { id });
        app.update();
        let registry = app.world().resource::<ShaderRegistry>();
        assert!(registry.fog(slot).is_none());
        assert!(registry.fog(other).is_some());
        assert_eq!(app.world().resource::<MaterialBindings>().len(), 1);
    }

    #[test]
    fn test_unbind_unknown_material_is_noop() {
        let mut registry = ShaderRegistry::default();
        let mut bindings = MaterialBindings::default();
        assert!(!bindings.unbind_ground(&mut registry, AssetId::default()));
        assert!(bindings.is_empty());
    }
}
