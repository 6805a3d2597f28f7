//! Per-shader uniform state and the once-per-frame broadcast into it.
//!
//! Every fog-shaded material owns an independent [`FogUniformSet`] stored in
//! an arena indexed by [`FogSlot`]. Slots are never reused, so a stale slot
//! from a disposed material can never alias a newer one. The three tree
//! materials each own a [`ColorGradientUniformSet`] keyed by [`TreeSlot`].
//!
//! The rendering layer copies these values onto GPU material assets in
//! `FrameSet::Upload`, after the broadcast has run.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation_clock::AnimationClock;
use crate::config_error::ConfigError;
use crate::value_mapper::clamp_unit;

// =============================================================================
// Slots
// =============================================================================

/// Index of one of the three tree/color slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TreeSlot(u8);

impl TreeSlot {
    pub const COUNT: usize = 3;
    pub const ALL: [TreeSlot; TreeSlot::COUNT] = [TreeSlot(0), TreeSlot(1), TreeSlot(2)];

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for TreeSlot {
    type Error = ConfigError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if index < TreeSlot::COUNT {
            Ok(TreeSlot(index as u8))
        } else {
            Err(ConfigError::InvalidTreeSlot {
                index,
                slots: TreeSlot::COUNT,
            })
        }
    }
}

impl From<TreeSlot> for usize {
    fn from(slot: TreeSlot) -> Self {
        slot.index()
    }
}

/// Stable handle to a registered fog uniform set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FogSlot(u32);

impl FogSlot {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// Uniform sets
// =============================================================================

/// Values written into one fog shader each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FogUniformSet {
    pub wind_enabled: bool,
    /// Accumulated animation time, seconds.
    pub fog_time: f64,
    /// Wind strength in shader units.
    pub wind_intensity: f64,
}

/// The three fixed colors of a tree gradient (sRGB, components in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStops {
    pub low: [f32; 3],
    pub mid: [f32; 3],
    pub high: [f32; 3],
}

impl Default for ColorStops {
    fn default() -> Self {
        Self {
            low: [0.0, 1.0, 0.0],
            mid: [1.0, 0.5, 0.0],
            high: [1.0, 0.0, 0.0],
        }
    }
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] * (1.0 - t) + b[0] * t,
        a[1] * (1.0 - t) + b[1] * t,
        a[2] * (1.0 - t) + b[2] * t,
    ]
}

impl ColorStops {
    /// Gradient color at `factor`: low→mid over [0, 0.5], mid→high over
    /// (0.5, 1]. Mirrors `tree_gradient.wgsl`.
    pub fn sample(&self, factor: f32) -> [f32; 3] {
        let f = factor.clamp(0.0, 1.0);
        if f <= 0.5 {
            mix3(self.low, self.mid, f / 0.5)
        } else {
            mix3(self.mid, self.high, (f - 0.5) / 0.5)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = self.low.iter().chain(&self.mid).chain(&self.high);
        for c in all {
            if !(0.0..=1.0).contains(c) {
                return Err(ConfigError::InvalidSetting(format!(
                    "tree color component {c} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Gradient state of one tree material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGradientUniformSet {
    /// Position along the gradient, always in [0, 1].
    pub gradient_factor: f64,
    pub stops: ColorStops,
}

impl ColorGradientUniformSet {
    /// A gradient at the low stop until the first reading arrives.
    pub fn new(stops: ColorStops) -> Self {
        Self {
            gradient_factor: 0.0,
            stops,
        }
    }

    pub fn color(&self) -> [f32; 3] {
        self.stops.sample(self.gradient_factor as f32)
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Resource, Debug, Default)]
pub struct ShaderRegistry {
    fog: Vec<Option<FogUniformSet>>,
    colors: [Option<ColorGradientUniformSet>; TreeSlot::COUNT],
    broadcasts: u64,
}

impl ShaderRegistry {
    /// Register a fog shader. Its uniform set starts at defaults and is
    /// overwritten by the next broadcast.
    pub fn register_fog(&mut self) -> FogSlot {
        let slot = FogSlot(self.fog.len() as u32);
        self.fog.push(Some(FogUniformSet::default()));
        slot
    }

    /// Drop a fog shader's uniform set. Returns `false` if it was already gone.
    pub fn release_fog(&mut self, slot: FogSlot) -> bool {
        match self.fog.get_mut(slot.index()) {
            Some(entry) => entry.take().is_some(),
            None => false,
        }
    }

    pub fn fog(&self, slot: FogSlot) -> Option<&FogUniformSet> {
        self.fog.get(slot.index()).and_then(Option::as_ref)
    }

    pub fn live_fog_count(&self) -> usize {
        self.fog.iter().flatten().count()
    }

    /// Copy `snapshot` into every live fog uniform set. Returns how many
    /// sets were written.
    pub fn broadcast_fog(&mut self, snapshot: &FogUniformSet) -> usize {
        let mut written = 0;
        for set in self.fog.iter_mut().flatten() {
            *set = *snapshot;
            written += 1;
        }
        self.broadcasts += 1;
        written
    }

    /// Number of broadcasts performed since startup.
    pub fn broadcast_count(&self) -> u64 {
        self.broadcasts
    }

    /// Register the color shader of the tree at `index`.
    pub fn register_color(
        &mut self,
        index: usize,
        stops: ColorStops,
    ) -> Result<TreeSlot, ConfigError> {
        let slot = TreeSlot::try_from(index)?;
        self.colors[slot.index()] = Some(ColorGradientUniformSet::new(stops));
        Ok(slot)
    }

    pub fn release_color(&mut self, slot: TreeSlot) -> bool {
        self.colors[slot.index()].take().is_some()
    }

    pub fn color(&self, slot: TreeSlot) -> Option<&ColorGradientUniformSet> {
        self.colors[slot.index()].as_ref()
    }

    /// Set a tree's gradient position, clamped to [0, 1]. Returns `false`
    /// when no color shader is registered for the slot.
    pub fn set_gradient_factor(&mut self, slot: TreeSlot, factor: f64) -> bool {
        match self.colors[slot.index()].as_mut() {
            Some(set) => {
                set.gradient_factor = clamp_unit(factor);
                true
            }
            None => false,
        }
    }

    /// Release every uniform set (teardown).
    pub fn clear(&mut self) {
        self.fog.iter_mut().for_each(|s| *s = None);
        self.colors = [None; TreeSlot::COUNT];
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Copies the clock snapshot into every registered fog shader.
pub fn broadcast_fog_uniforms(clock: Res<AnimationClock>, mut registry: ResMut<ShaderRegistry>) {
    let snapshot = clock.fog_snapshot();
    registry.broadcast_fog(&snapshot);
}

/// Registers the three tree color shaders from the configured stops.
pub fn register_tree_colors(
    config: Res<crate::config::CanopyConfig>,
    mut registry: ResMut<ShaderRegistry>,
) {
    for slot in TreeSlot::ALL {
        if let Err(e) = registry.register_color(slot.index(), config.tree_colors) {
            error!("Failed to register tree color slot: {}", e);
        }
    }
}

/// Releases all uniform state once the app is exiting so nothing is
/// broadcast into disposed materials.
pub fn release_registry_on_exit(
    mut exits: EventReader<AppExit>,
    mut registry: ResMut<ShaderRegistry>,
) {
    if exits.read().next().is_some() {
        let live = registry.live_fog_count();
        registry.clear();
        info!("Released {} fog uniform sets on exit", live);
    }
}
