//! Routing of named external parameters onto tree slots and the wind clock.
//!
//! Sensor batches arrive as [`ParameterBatch`] events. Each recognised name
//! drives one tree: the gradient position becomes `1 - value` and the growth
//! amount becomes `value`, both after normalising the reading from its
//! declared range into [0, 1]. Live batches carry only the wind signal.
//! Unrecognised names are ignored without touching any state.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation_clock::AnimationClock;
use crate::config_error::ConfigError;
use crate::parameter_config::ParameterConfig;
use crate::shader_registry::{ShaderRegistry, TreeSlot};
use crate::tree_growth::{TreeGenerator, TreeGrowthState};
use crate::value_mapper::{clamp_unit, ValueMapper};

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedParameter {
    pub name: String,
    pub value: f64,
}

impl NamedParameter {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A batch of sensor readings. Order within a batch carries no meaning.
#[derive(Event, Debug, Clone, Default)]
pub struct ParameterBatch(pub Vec<NamedParameter>);

/// A batch of live control values.
#[derive(Event, Debug, Clone, Default)]
pub struct LiveParameterBatch(pub Vec<NamedParameter>);

// =============================================================================
// Route table
// =============================================================================

/// Config entry binding a parameter name to a tree slot index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub name: String,
    pub slot: usize,
}

pub fn default_routes() -> Vec<RouteEntry> {
    ["no2", "co", "pm10"]
        .iter()
        .enumerate()
        .map(|(slot, name)| RouteEntry {
            name: name.to_string(),
            slot,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteOutcome {
    Routed {
        slot: TreeSlot,
        gradient_factor: f64,
        growth: f64,
    },
    Ignored,
}

#[derive(Debug, Clone)]
struct Route {
    name: String,
    slot: TreeSlot,
    normalizer: ValueMapper,
}

#[derive(Resource, Debug, Clone)]
pub struct ParameterRouter {
    routes: Vec<Route>,
}

impl Default for ParameterRouter {
    fn default() -> Self {
        Self {
            routes: TreeSlot::ALL
                .iter()
                .zip(default_routes())
                .map(|(slot, entry)| Route {
                    name: entry.name,
                    slot: *slot,
                    normalizer: ValueMapper::unit(),
                })
                .collect(),
        }
    }
}

impl ParameterRouter {
    /// Build the table, validating slot indices and parameter ranges. A
    /// route whose parameter has no numeric declaration reads values as
    /// already normalised.
    pub fn new(entries: &[RouteEntry], parameters: &ParameterConfig) -> Result<Self, ConfigError> {
        let mut routes: Vec<Route> = Vec::with_capacity(entries.len());
        for entry in entries {
            if routes.iter().any(|r| r.name == entry.name) {
                return Err(ConfigError::DuplicateRoute(entry.name.clone()));
            }
            let slot = TreeSlot::try_from(entry.slot)?;
            if let Some(taken) = routes.iter().find(|r| r.slot == slot) {
                return Err(ConfigError::DuplicateRouteSlot {
                    slot: slot.index(),
                    first: taken.name.clone(),
                    second: entry.name.clone(),
                });
            }
            let normalizer = match parameters.numeric(&entry.name) {
                Some(p) => p.normalizer()?,
                None => ValueMapper::unit(),
            };
            routes.push(Route {
                name: entry.name.clone(),
                slot,
                normalizer,
            });
        }
        Ok(Self { routes })
    }

    pub fn slot_for(&self, name: &str) -> Option<TreeSlot> {
        self.routes.iter().find(|r| r.name == name).map(|r| r.slot)
    }

    /// Names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.name.as_str())
    }

    pub fn route(
        &self,
        param: &NamedParameter,
        registry: &mut ShaderRegistry,
        trees: &mut impl TreeGenerator,
    ) -> RouteOutcome {
        let Some(route) = self.routes.iter().find(|r| r.name == param.name) else {
            return RouteOutcome::Ignored;
        };
        let value = clamp_unit(route.normalizer.map(param.value));
        let gradient_factor = 1.0 - value;
        registry.set_gradient_factor(route.slot, gradient_factor);
        trees.update_growth(route.slot, value);
        RouteOutcome::Routed {
            slot: route.slot,
            gradient_factor,
            growth: value,
        }
    }

    /// Route every parameter of a batch. Returns how many were recognised.
    pub fn route_batch(
        &self,
        batch: &[NamedParameter],
        registry: &mut ShaderRegistry,
        trees: &mut impl TreeGenerator,
    ) -> usize {
        let mut routed = 0;
        for param in batch {
            match self.route(param, &mut *registry, &mut *trees) {
                RouteOutcome::Routed { .. } => routed += 1,
                RouteOutcome::Ignored => debug!("Ignoring unrouted parameter '{}'", param.name),
            }
        }
        routed
    }
}

// =============================================================================
// Live parameters
// =============================================================================

#[derive(Resource, Debug, Clone)]
pub struct LiveParameterRouter {
    wind_signal: String,
}

impl Default for LiveParameterRouter {
    fn default() -> Self {
        Self::new("windForce")
    }
}

impl LiveParameterRouter {
    pub fn new(wind_signal: &str) -> Self {
        Self {
            wind_signal: wind_signal.to_string(),
        }
    }

    pub fn wind_signal(&self) -> &str {
        &self.wind_signal
    }

    /// Apply a live parameter. Only the wind signal is recognised.
    pub fn route(&self, param: &NamedParameter, clock: &mut AnimationClock) -> bool {
        if param.name != self.wind_signal {
            return false;
        }
        clock.set_wind_intensity(param.value);
        true
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn route_parameter_batches(
    mut batches: EventReader<ParameterBatch>,
    router: Res<ParameterRouter>,
    mut registry: ResMut<ShaderRegistry>,
    mut trees: ResMut<TreeGrowthState>,
) {
    for batch in batches.read() {
        router.route_batch(&batch.0, &mut registry, &mut *trees);
    }
}

pub fn route_live_parameter_batches(
    mut batches: EventReader<LiveParameterBatch>,
    router: Res<LiveParameterRouter>,
    mut clock: ResMut<AnimationClock>,
) {
    for batch in batches.read() {
        for param in &batch.0 {
            if !router.route(param, &mut clock) {
                debug!("Ignoring unknown live parameter '{}'", param.name);
            }
        }
    }
}
