//! # TestScene: headless integration test harness
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` with manual time steps so
//! integration tests can drive whole frames without a window or renderer.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::animation_clock::AnimationClock;
use crate::config::CanopyConfig;
use crate::parameter_router::{LiveParameterBatch, NamedParameter, ParameterBatch};
use crate::sensor_feed::FeedSource;
use crate::shader_registry::{FogSlot, ShaderRegistry, TreeSlot};
use crate::tree_growth::TreeGrowthState;
use crate::SimulationPlugin;

/// Simulated frame length.
pub const FRAME: Duration = Duration::from_millis(16);

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
pub struct TestScene {
    app: App,
}

impl Default for TestScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TestScene {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Default configuration with the sensor feed disabled, so only the test
    /// sends parameters.
    pub fn new() -> Self {
        let mut config = CanopyConfig::default();
        config.feed.source = FeedSource::Disabled;
        Self::with_config(config)
    }

    /// Build from an explicit config. Runs one update so Startup systems
    /// execute and the first frame has ticked.
    pub fn with_config(config: CanopyConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
        app.insert_resource(config);
        app.add_plugins(SimulationPlugin);
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_wind(mut self, intensity: f64) -> Self {
        self.clock_mut().set_wind_intensity(intensity);
        self
    }

    pub fn with_wind_enabled(mut self, enabled: bool) -> Self {
        self.clock_mut().set_wind_enabled(enabled);
        self
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Register `n` fog shaders the way material setup would.
    pub fn register_fog_shaders(&mut self, n: usize) -> Vec<FogSlot> {
        let mut registry = self.app.world_mut().resource_mut::<ShaderRegistry>();
        (0..n).map(|_| registry.register_fog()).collect()
    }

    pub fn send_parameters(&mut self, params: &[(&str, f64)]) {
        let batch = params
            .iter()
            .map(|(name, value)| NamedParameter::new(*name, *value))
            .collect();
        self.app.world_mut().send_event(ParameterBatch(batch));
    }

    pub fn send_live(&mut self, params: &[(&str, f64)]) {
        let batch = params
            .iter()
            .map(|(name, value)| NamedParameter::new(*name, *value))
            .collect();
        self.app.world_mut().send_event(LiveParameterBatch(batch));
    }

    /// Run one frame.
    pub fn frame(&mut self) {
        self.app.update();
    }

    pub fn frames(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Send `AppExit` and run the frame that handles it.
    pub fn exit(&mut self) {
        self.app.world_mut().send_event(AppExit::Success);
        self.app.update();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn resource_mut<T: Resource>(&mut self) -> Mut<'_, T> {
        self.app.world_mut().resource_mut::<T>()
    }

    pub fn clock(&self) -> &AnimationClock {
        self.resource::<AnimationClock>()
    }

    pub fn clock_mut(&mut self) -> Mut<'_, AnimationClock> {
        self.resource_mut::<AnimationClock>()
    }

    pub fn registry(&self) -> &ShaderRegistry {
        self.resource::<ShaderRegistry>()
    }

    pub fn trees(&self) -> &TreeGrowthState {
        self.resource::<TreeGrowthState>()
    }

    pub fn gradient_factor(&self, slot: usize) -> Option<f64> {
        let slot = TreeSlot::try_from(slot).ok()?;
        self.registry().color(slot).map(|c| c.gradient_factor)
    }

    pub fn growth_target(&self, slot: usize) -> Option<f64> {
        let slot = TreeSlot::try_from(slot).ok()?;
        Some(self.trees().target(slot))
    }
}
