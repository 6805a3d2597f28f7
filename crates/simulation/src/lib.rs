use bevy::prelude::*;

pub mod animation_clock;
pub mod config;
pub mod config_error;
pub mod feed_timer;
pub mod fog_model;
pub mod frame_sets;
pub mod noise;
pub mod parameter_config;
pub mod parameter_router;
pub mod sensor_feed;
pub mod shader_registry;
pub mod tree_growth;
pub mod value_mapper;

#[cfg(test)]
pub mod test_harness;

use animation_clock::AnimationClock;
use config::CanopyConfig;
use feed_timer::FeedTimer;
use frame_sets::FrameSet;
use parameter_router::{LiveParameterBatch, ParameterBatch, ParameterRouter};
use sensor_feed::ActiveFeed;
use shader_registry::ShaderRegistry;
use tree_growth::TreeGrowthState;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Headless scene state: clock, uniform registry, routing, feed.
///
/// Reads `CanopyConfig` if it was inserted before the plugin, otherwise uses
/// defaults. The binary validates the config first, so the fallbacks below
/// only trigger for configs that skipped validation.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CanopyConfig>();
        let config = app.world().resource::<CanopyConfig>().clone();

        let router = config.parameter_router().unwrap_or_else(|e| {
            error!("Invalid parameter routes, using defaults: {}", e);
            ParameterRouter::default()
        });

        let mut timer = FeedTimer::with_interval(config.feed.interval_ms).unwrap_or_else(|e| {
            error!("Invalid feed interval, using default: {}", e);
            FeedTimer::default()
        });
        let feed = sensor_feed::build_feed(&config.feed, &config.parameters).unwrap_or_else(|e| {
            error!("Sensor feed unavailable: {}", e);
            None
        });
        if feed.is_some() && config.feed.autostart {
            timer.start();
        }

        let clock = AnimationClock::new(
            config.wind.mapping,
            config.wind.enabled,
            config.initial_wind_intensity(),
        );

        FrameSet::configure(app);

        app.add_event::<ParameterBatch>()
            .add_event::<LiveParameterBatch>()
            .insert_resource(router)
            .insert_resource(config.live_router())
            .insert_resource(clock)
            .insert_resource(TreeGrowthState::new(config.trees.growth_easing))
            .insert_resource(timer)
            .insert_resource(ActiveFeed::new(feed))
            .init_resource::<ShaderRegistry>()
            .add_systems(Startup, shader_registry::register_tree_colors)
            .add_systems(
                Update,
                (
                    sensor_feed::drive_sensor_feed.in_set(FrameSet::Feed),
                    (
                        parameter_router::route_parameter_batches,
                        parameter_router::route_live_parameter_batches,
                    )
                        .in_set(FrameSet::Route),
                    animation_clock::advance_animation_clock.in_set(FrameSet::Clock),
                    shader_registry::broadcast_fog_uniforms.in_set(FrameSet::Broadcast),
                    tree_growth::animate_trees.in_set(FrameSet::Animate),
                ),
            )
            .add_systems(Last, shader_registry::release_registry_on_exit);
    }
}
