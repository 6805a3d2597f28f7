//! Fixed-interval ticker that paces the sensor feed.
//!
//! Starting the timer fires one tick immediately, then one per interval.
//! Intervals of one second or less are rejected.

use std::time::Duration;

use bevy::prelude::*;

use crate::config_error::ConfigError;

/// Interval used until one is configured.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Configured intervals must be strictly greater than this.
pub const MIN_INTERVAL_MS: u64 = 1000;

#[derive(Resource, Debug, Clone)]
pub struct FeedTimer {
    timer: Timer,
    running: bool,
    /// Ticks fired since the last reset.
    timestep: u64,
    fire_on_next_advance: bool,
}

impl Default for FeedTimer {
    fn default() -> Self {
        Self {
            timer: Timer::new(Duration::from_millis(DEFAULT_INTERVAL_MS), TimerMode::Repeating),
            running: false,
            timestep: 0,
            fire_on_next_advance: false,
        }
    }
}

impl FeedTimer {
    pub fn with_interval(interval_ms: u64) -> Result<Self, ConfigError> {
        let mut timer = Self::default();
        timer.set_interval(interval_ms)?;
        Ok(timer)
    }

    pub fn set_interval(&mut self, interval_ms: u64) -> Result<(), ConfigError> {
        validate_interval(interval_ms)?;
        self.timer.set_duration(Duration::from_millis(interval_ms));
        self.timer.reset();
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        self.timer.duration()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Start ticking. The first tick fires on the next `advance`. Starting
    /// an already running timer does nothing.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.fire_on_next_advance = true;
        self.timer.reset();
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.fire_on_next_advance = false;
    }

    /// Stop and rewind the timestep counter.
    pub fn reset(&mut self) {
        self.stop();
        self.timestep = 0;
        self.timer.reset();
    }

    /// Advance by `delta`; returns how many ticks fired.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        let mut fired = 0;
        if self.fire_on_next_advance {
            self.fire_on_next_advance = false;
            fired += 1;
        }
        self.timer.tick(delta);
        fired += self.timer.times_finished_this_tick();
        self.timestep += fired as u64;
        fired
    }
}

pub fn validate_interval(interval_ms: u64) -> Result<(), ConfigError> {
    if interval_ms <= MIN_INTERVAL_MS {
        return Err(ConfigError::FeedIntervalTooShort {
            interval_ms,
            minimum_ms: MIN_INTERVAL_MS,
        });
    }
    Ok(())
}
