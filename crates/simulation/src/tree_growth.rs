//! Growth targets for the three trees and their per-frame easing.
//!
//! Routed sensor values set a slot's target; the displayed growth eases
//! toward it once per frame so trees visibly grow or shrink rather than
//! snapping. The rendering layer reads [`TreeGrowthState::growth`].

use bevy::prelude::*;

use crate::shader_registry::TreeSlot;
use crate::value_mapper::clamp_unit;

/// Below this distance the displayed growth snaps onto its target.
const SNAP_EPSILON: f64 = 1.0e-4;

/// Receiver of growth updates, implemented by whatever draws the trees.
pub trait TreeGenerator {
    /// Set the growth amount in [0, 1] for a tree.
    fn update_growth(&mut self, slot: TreeSlot, amount: f64);
    /// Advance growth animation by one frame.
    fn animate_frame(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlotGrowth {
    pub target: f64,
    pub current: f64,
}

#[derive(Resource, Debug, Clone)]
pub struct TreeGrowthState {
    slots: [SlotGrowth; TreeSlot::COUNT],
    /// Fraction of the remaining distance covered each frame, in (0, 1].
    easing: f64,
    frames_animated: u64,
}

impl Default for TreeGrowthState {
    fn default() -> Self {
        Self::new(0.08)
    }
}

impl TreeGrowthState {
    pub fn new(easing: f64) -> Self {
        let easing = if easing.is_finite() && easing > 0.0 {
            easing.min(1.0)
        } else {
            1.0
        };
        Self {
            slots: [SlotGrowth::default(); TreeSlot::COUNT],
            easing,
            frames_animated: 0,
        }
    }

    pub fn slot(&self, slot: TreeSlot) -> SlotGrowth {
        self.slots[slot.index()]
    }

    /// Displayed growth in [0, 1].
    pub fn growth(&self, slot: TreeSlot) -> f64 {
        self.slots[slot.index()].current
    }

    pub fn target(&self, slot: TreeSlot) -> f64 {
        self.slots[slot.index()].target
    }

    pub fn frames_animated(&self) -> u64 {
        self.frames_animated
    }

    pub fn is_settled(&self) -> bool {
        self.slots.iter().all(|s| s.current == s.target)
    }
}

impl TreeGenerator for TreeGrowthState {
    fn update_growth(&mut self, slot: TreeSlot, amount: f64) {
        self.slots[slot.index()].target = clamp_unit(amount);
    }

    fn animate_frame(&mut self) {
        for s in &mut self.slots {
            let gap = s.target - s.current;
            if gap.abs() < SNAP_EPSILON {
                s.current = s.target;
            } else {
                s.current += gap * self.easing;
            }
        }
        self.frames_animated += 1;
    }
}

pub fn animate_trees(mut trees: ResMut<TreeGrowthState>) {
    if trees.is_settled() {
        // Keep the frame counter moving without triggering change detection.
        trees.bypass_change_detection().frames_animated += 1;
        return;
    }
    trees.animate_frame();
}
