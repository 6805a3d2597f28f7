//! Sources of parameter batches for the scene.
//!
//! A [`SensorFeed`] produces one batch per [`FeedTimer`] tick. Two sources
//! ship with the app: a seeded random walk over the declared parameters and
//! a scripted sequence loaded from JSON.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config_error::ConfigError;
use crate::feed_timer::FeedTimer;
use crate::parameter_config::ParameterConfig;
use crate::parameter_router::{LiveParameterBatch, NamedParameter, ParameterBatch};

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSource {
    /// Random walk seeded for reproducible runs.
    Synthetic { seed: u64 },
    /// Batches replayed from a JSON file.
    Scripted {
        path: PathBuf,
        #[serde(default)]
        looping: bool,
    },
    /// No feed; parameters only change through the panel.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub interval_ms: u64,
    pub autostart: bool,
    pub source: FeedSource,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            autostart: true,
            source: FeedSource::Synthetic { seed: 42 },
        }
    }
}

// =============================================================================
// Feeds
// =============================================================================

/// One tick's worth of parameter updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedBatch {
    #[serde(default)]
    pub parameters: Vec<NamedParameter>,
    #[serde(default)]
    pub live: Vec<NamedParameter>,
}

pub trait SensorFeed: Send + Sync {
    /// Batch for tick number `timestep`, or `None` when the feed is exhausted.
    fn next_batch(&mut self, timestep: u64) -> Option<FeedBatch>;

    fn name(&self) -> &str;
}

struct WalkedValue {
    name: String,
    min: f64,
    max: f64,
    value: f64,
}

/// Bounded random walk over every declared parameter.
pub struct SyntheticFeed {
    rng: ChaCha8Rng,
    numeric: Vec<WalkedValue>,
    live: Vec<WalkedValue>,
    /// Largest step per tick as a fraction of each parameter's range.
    step: f64,
}

impl SyntheticFeed {
    pub fn new(seed: u64, parameters: &ParameterConfig) -> Self {
        let numeric = parameters
            .numeric_parameters
            .iter()
            .map(|p| WalkedValue {
                name: p.name.clone(),
                min: p.min.min(p.max),
                max: p.min.max(p.max),
                value: p.value,
            })
            .collect();
        let live = parameters
            .live_parameters
            .iter()
            .map(|p| WalkedValue {
                name: p.name.clone(),
                min: 0.0,
                max: 1.0,
                value: p.value,
            })
            .collect();
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            numeric,
            live,
            step: 0.15,
        }
    }

    fn walk(rng: &mut ChaCha8Rng, values: &mut [WalkedValue], step: f64) -> Vec<NamedParameter> {
        values
            .iter_mut()
            .map(|v| {
                let span = v.max - v.min;
                let delta = rng.gen_range(-step..=step) * span;
                v.value = (v.value + delta).clamp(v.min, v.max);
                NamedParameter::new(v.name.clone(), v.value)
            })
            .collect()
    }
}

impl SensorFeed for SyntheticFeed {
    fn next_batch(&mut self, _timestep: u64) -> Option<FeedBatch> {
        let parameters = Self::walk(&mut self.rng, &mut self.numeric, self.step);
        let live = Self::walk(&mut self.rng, &mut self.live, self.step);
        Some(FeedBatch { parameters, live })
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Pre-recorded batches replayed in order.
pub struct ScriptedFeed {
    batches: Vec<FeedBatch>,
    cursor: usize,
    looping: bool,
}

impl ScriptedFeed {
    pub fn new(batches: Vec<FeedBatch>, looping: bool) -> Self {
        Self {
            batches,
            cursor: 0,
            looping,
        }
    }

    pub fn from_json(json: &str, looping: bool) -> Result<Self, ConfigError> {
        let batches: Vec<FeedBatch> = serde_json::from_str(json)?;
        Ok(Self::new(batches, looping))
    }

    pub fn load(path: &Path, looping: bool) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, looping)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl SensorFeed for ScriptedFeed {
    fn next_batch(&mut self, _timestep: u64) -> Option<FeedBatch> {
        if self.batches.is_empty() {
            return None;
        }
        if self.cursor >= self.batches.len() {
            if !self.looping {
                return None;
            }
            self.cursor = 0;
        }
        let batch = self.batches[self.cursor].clone();
        self.cursor += 1;
        Some(batch)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Build the configured feed. `Disabled` yields `None`.
pub fn build_feed(
    settings: &FeedSettings,
    parameters: &ParameterConfig,
) -> Result<Option<Box<dyn SensorFeed>>, ConfigError> {
    Ok(match &settings.source {
        FeedSource::Synthetic { seed } => Some(Box::new(SyntheticFeed::new(*seed, parameters))),
        FeedSource::Scripted { path, looping } => Some(Box::new(ScriptedFeed::load(path, *looping)?)),
        FeedSource::Disabled => None,
    })
}

// =============================================================================
// Resource + system
// =============================================================================

#[derive(Resource, Default)]
pub struct ActiveFeed {
    feed: Option<Box<dyn SensorFeed>>,
    exhausted: bool,
}

impl ActiveFeed {
    pub fn new(feed: Option<Box<dyn SensorFeed>>) -> Self {
        Self {
            feed,
            exhausted: false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.feed.as_ref().map(|f| f.name())
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Advances the feed timer and emits one pair of batches per tick.
pub fn drive_sensor_feed(
    time: Res<Time>,
    mut timer: ResMut<FeedTimer>,
    mut active: ResMut<ActiveFeed>,
    mut parameters: EventWriter<ParameterBatch>,
    mut live: EventWriter<LiveParameterBatch>,
) {
    let fired = timer.advance(time.delta());
    if fired == 0 {
        return;
    }
    let timestep = timer.timestep();
    let active = &mut *active;
    let Some(feed) = active.feed.as_mut() else {
        return;
    };
    for _ in 0..fired {
        match feed.next_batch(timestep) {
            Some(batch) => {
                if !batch.parameters.is_empty() {
                    parameters.send(ParameterBatch(batch.parameters));
                }
                if !batch.live.is_empty() {
                    live.send(LiveParameterBatch(batch.live));
                }
            }
            None => {
                if !active.exhausted {
                    info!("Sensor feed '{}' exhausted, stopping timer", feed.name());
                    active.exhausted = true;
                }
                timer.stop();
                break;
            }
        }
    }
}
