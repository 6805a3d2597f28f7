//! Accumulated animation time driving the fog.
//!
//! The clock is running from construction and never stops or resets while
//! the app lives. Each rendered frame adds the real elapsed time plus a
//! wind-dependent increment, so stronger wind makes the fog drift faster.
//! The increment is applied per frame, not per second: at higher frame rates
//! the fog moves faster.

use bevy::core::FrameCount;
use bevy::prelude::*;

use crate::shader_registry::FogUniformSet;
use crate::value_mapper::{clamp_unit, WindMapping};

#[derive(Resource, Debug, Clone)]
pub struct AnimationClock {
    /// Seconds of fog time, never decreasing.
    accumulated_time: f64,
    /// Wind signal in [0, 1].
    wind_intensity: f64,
    wind_enabled: bool,
    mapping: WindMapping,
    /// Timestamp (seconds) of the previous frame, `None` before the first.
    previous_timestamp: Option<f64>,
    last_ticked_frame: Option<u32>,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(WindMapping::default(), true, 1.0)
    }
}

impl AnimationClock {
    pub fn new(mapping: WindMapping, wind_enabled: bool, wind_intensity: f64) -> Self {
        Self {
            accumulated_time: 0.0,
            wind_intensity: clamp_unit(wind_intensity),
            wind_enabled,
            mapping,
            previous_timestamp: None,
            last_ticked_frame: None,
        }
    }

    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }

    pub fn wind_intensity(&self) -> f64 {
        self.wind_intensity
    }

    pub fn wind_enabled(&self) -> bool {
        self.wind_enabled
    }

    pub fn mapping(&self) -> &WindMapping {
        &self.mapping
    }

    /// Store a new wind signal, clamped to [0, 1].
    pub fn set_wind_intensity(&mut self, value: f64) {
        self.wind_intensity = clamp_unit(value);
    }

    pub fn set_wind_enabled(&mut self, enabled: bool) {
        self.wind_enabled = enabled;
    }

    /// Seconds of fog time added for the current wind on top of real time.
    pub fn wind_increment(&self) -> f64 {
        self.mapping
            .time_increment
            .map(self.wind_intensity)
            .max(0.0)
    }

    /// Advance by `elapsed_seconds` plus the wind increment. Negative or
    /// non-finite elapsed values count as zero. Returns the new total.
    pub fn tick(&mut self, elapsed_seconds: f64) -> f64 {
        let elapsed = if elapsed_seconds.is_finite() {
            elapsed_seconds.max(0.0)
        } else {
            0.0
        };
        self.accumulated_time += elapsed + self.wind_increment();
        self.accumulated_time
    }

    /// Seconds since the previous frame's timestamp. The first frame has
    /// no predecessor and reports 0.
    pub fn frame_delta(&mut self, now_seconds: f64) -> f64 {
        let delta = match self.previous_timestamp {
            Some(prev) => (now_seconds - prev).max(0.0),
            None => 0.0,
        };
        self.previous_timestamp = Some(now_seconds);
        delta
    }

    /// Tick once for `frame`. A second call for the same frame is refused
    /// and returns `false`.
    pub fn tick_frame(&mut self, frame: u32, now_seconds: f64) -> bool {
        if self.last_ticked_frame == Some(frame) {
            warn!("AnimationClock: frame {} already ticked, skipping", frame);
            return false;
        }
        let delta = self.frame_delta(now_seconds);
        self.tick(delta);
        self.last_ticked_frame = Some(frame);
        true
    }

    /// Uniform values every fog shader receives this frame.
    pub fn fog_snapshot(&self) -> FogUniformSet {
        FogUniformSet {
            wind_enabled: self.wind_enabled,
            fog_time: self.accumulated_time,
            wind_intensity: self.mapping.shader_strength.map(self.wind_intensity),
        }
    }
}

pub fn advance_animation_clock(
    time: Res<Time>,
    frames: Res<FrameCount>,
    mut clock: ResMut<AnimationClock>,
) {
    clock.tick_frame(frames.0, time.elapsed_secs_f64());
}
