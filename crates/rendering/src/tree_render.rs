//! Procedural trees, one per `TreeSlot`.
//!
//! The skeleton is a recursive three-way branching whose angles are jittered
//! with seeded noise, so a given layout always produces the same trees.
//! Growth drives two things each frame the state changes:
//!
//! - the root's uniform scale, from `min_scale` at 0 to 1 at full growth
//! - which branch levels are shown; deeper levels appear as growth rises

use std::f32::consts::TAU;

use bevy::prelude::*;
use fastnoise_lite::{FastNoiseLite, NoiseType};

use simulation::config::{CanopyConfig, TreeLayout};
use simulation::shader_registry::{ShaderRegistry, TreeSlot};
use simulation::tree_growth::TreeGrowthState;

use crate::materials::{tree_material, TreeMaterial};
use crate::shader_bindings::MaterialBindings;

// =============================================================================
// Constants
// =============================================================================

const BRANCHES_PER_NODE: usize = 3;
const LENGTH_DECAY: f32 = 0.72;
const RADIUS_DECAY: f32 = 0.62;
const TRUNK_RADIUS_RATIO: f32 = 0.06;
/// Angle between a child and its parent's axis, in radians.
const BASE_TILT: f32 = 0.6;
const TILT_JITTER: f32 = 0.25;
const AZIMUTH_JITTER: f32 = 0.5;
const JITTER_FREQUENCY: f32 = 0.35;

// =============================================================================
// Components
// =============================================================================

#[derive(Component, Debug, Clone, Copy)]
pub struct TreeRoot {
    pub slot: TreeSlot,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Branch {
    pub slot: TreeSlot,
    /// Growth at which this branch becomes visible.
    pub reveal_at: f32,
}

// =============================================================================
// Skeleton
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BranchSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub depth: u32,
    pub reveal_at: f32,
}

impl BranchSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or(Vec3::Y)
    }

    /// Transform placing a unit cylinder (radius 1, height 1, centred on the
    /// origin along +Y) onto this segment.
    pub fn transform(&self) -> Transform {
        Transform {
            translation: (self.start + self.end) * 0.5,
            rotation: Quat::from_rotation_arc(Vec3::Y, self.direction()),
            scale: Vec3::new(self.radius, self.length(), self.radius),
        }
    }
}

fn slot_seed(seed: u64, slot: TreeSlot) -> i32 {
    let mixed = seed ^ (slot.index() as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    (mixed ^ (mixed >> 32)) as i32
}

pub fn grow_skeleton(layout: &TreeLayout, slot: TreeSlot) -> Vec<BranchSegment> {
    let mut noise = FastNoiseLite::with_seed(slot_seed(layout.seed, slot));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(JITTER_FREQUENCY));

    let levels = layout.branch_levels.min(TreeLayout::MAX_BRANCH_LEVELS);
    let mut segments = vec![BranchSegment {
        start: Vec3::ZERO,
        end: Vec3::Y * layout.trunk_height,
        radius: layout.trunk_height * TRUNK_RADIUS_RATIO,
        depth: 0,
        reveal_at: 0.0,
    }];
    let mut frontier = vec![0usize];

    for depth in 1..=levels {
        let reveal_at = depth as f32 / (levels + 1) as f32;
        let mut next = Vec::with_capacity(frontier.len() * BRANCHES_PER_NODE);
        for &parent_index in &frontier {
            let parent = segments[parent_index].clone();
            let axis = parent.direction();
            let (u, v) = axis.any_orthonormal_pair();
            let length = parent.length() * LENGTH_DECAY;
            for k in 0..BRANCHES_PER_NODE {
                let probe = parent.end + Vec3::new(k as f32 * 17.0, depth as f32 * 31.0, 0.0);
                let tilt = BASE_TILT + TILT_JITTER * noise.get_noise_3d(probe.x, probe.y, probe.z);
                let azimuth = k as f32 * TAU / BRANCHES_PER_NODE as f32
                    + AZIMUTH_JITTER * noise.get_noise_3d(probe.z, probe.x, probe.y);
                let radial = u * azimuth.cos() + v * azimuth.sin();
                let dir = (axis * tilt.cos() + radial * tilt.sin()).normalize_or(axis);
                segments.push(BranchSegment {
                    start: parent.end,
                    end: parent.end + dir * length,
                    radius: parent.radius * RADIUS_DECAY,
                    depth,
                    reveal_at,
                });
                next.push(segments.len() - 1);
            }
        }
        frontier = next;
    }
    segments
}

// =============================================================================
// Growth mapping
// =============================================================================

pub fn tree_scale(layout: &TreeLayout, growth: f64) -> f32 {
    let g = (growth as f32).clamp(0.0, 1.0);
    layout.min_scale + (1.0 - layout.min_scale) * g
}

pub fn branch_visible(reveal_at: f32, growth: f64) -> bool {
    growth as f32 >= reveal_at
}

// =============================================================================
// Systems
// =============================================================================

pub fn spawn_trees(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<TreeMaterial>>,
    mut registry: ResMut<ShaderRegistry>,
    mut bindings: ResMut<MaterialBindings>,
    config: Res<CanopyConfig>,
) {
    let layout = &config.trees;
    let branch_mesh = meshes.add(Cylinder::new(1.0, 1.0));
    let mut total = 0;

    for slot in TreeSlot::ALL {
        let material = materials.add(tree_material(&config.fog, &config.tree_colors));
        bindings.bind_tree(&mut registry, slot, material.id());

        let skeleton = grow_skeleton(layout, slot);
        total += skeleton.len();
        commands
            .spawn((
                TreeRoot { slot },
                Transform::from_xyz(layout.slot_x(slot), 0.0, 0.0)
                    .with_scale(Vec3::splat(tree_scale(layout, 0.0))),
                Visibility::default(),
            ))
            .with_children(|parent| {
                for segment in &skeleton {
                    let visibility = if branch_visible(segment.reveal_at, 0.0) {
                        Visibility::Inherited
                    } else {
                        Visibility::Hidden
                    };
                    parent.spawn((
                        Mesh3d(branch_mesh.clone()),
                        MeshMaterial3d(material.clone()),
                        segment.transform(),
                        visibility,
                        Branch {
                            slot,
                            reveal_at: segment.reveal_at,
                        },
                    ));
                }
            });
    }
    info!("Spawned {} trees ({} branch segments)", TreeSlot::COUNT, total);
}

pub fn apply_tree_growth(
    trees: Res<TreeGrowthState>,
    config: Res<CanopyConfig>,
    mut roots: Query<(&TreeRoot, &mut Transform)>,
    mut branches: Query<(&Branch, &mut Visibility)>,
) {
    if !trees.is_changed() {
        return;
    }
    for (root, mut transform) in &mut roots {
        let scale = Vec3::splat(tree_scale(&config.trees, trees.growth(root.slot)));
        if transform.scale != scale {
            transform.scale = scale;
        }
    }
    for (branch, mut visibility) in &mut branches {
        let wanted = if branch_visible(branch.reveal_at, trees.growth(branch.slot)) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}
