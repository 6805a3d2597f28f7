//! Startup configuration for the whole scene.
//!
//! [`CanopyConfig`] collects every tunable in one serde document so a run
//! can be reproduced from a single JSON file. Missing fields fall back to
//! defaults. [`CanopyConfig::validate`] is called before the app is built;
//! any failure there aborts startup.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config_error::ConfigError;
use crate::feed_timer::validate_interval;
use crate::fog_model::FogSettings;
use crate::parameter_config::ParameterConfig;
use crate::parameter_router::{default_routes, LiveParameterRouter, ParameterRouter, RouteEntry};
use crate::sensor_feed::{build_feed, FeedSettings};
use crate::shader_registry::{ColorStops, TreeSlot};
use crate::value_mapper::WindMapping;

/// Environment variable consulted for a config path when none is given on
/// the command line.
pub const CONFIG_ENV_VAR: &str = "CANOPY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindSettings {
    pub enabled: bool,
    pub mapping: WindMapping,
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            mapping: WindMapping::default(),
        }
    }
}

/// Placement and shape of the three trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeLayout {
    /// Distance between neighbouring trees along x.
    pub spacing: f32,
    pub trunk_height: f32,
    /// Branching depth of the generated skeleton.
    pub branch_levels: u32,
    pub seed: u64,
    /// Scale of a tree at zero growth.
    pub min_scale: f32,
    /// Per-frame easing of displayed growth toward its target.
    pub growth_easing: f64,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self {
            spacing: 200.0,
            trunk_height: 60.0,
            branch_levels: 4,
            seed: 1337,
            min_scale: 0.15,
            growth_easing: 0.08,
        }
    }
}

impl TreeLayout {
    pub const MAX_BRANCH_LEVELS: u32 = 7;

    pub fn slot_x(&self, slot: TreeSlot) -> f32 {
        slot.index() as f32 * self.spacing
    }

    /// x coordinate centred between the first and last tree.
    pub fn middle_x(&self) -> f32 {
        (TreeSlot::COUNT - 1) as f32 * self.spacing * 0.5
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyConfig {
    pub fog: FogSettings,
    pub wind: WindSettings,
    pub parameters: ParameterConfig,
    pub routes: Vec<RouteEntry>,
    /// Name of the live parameter carrying the wind signal.
    pub wind_signal: String,
    pub tree_colors: ColorStops,
    pub trees: TreeLayout,
    pub feed: FeedSettings,
    /// Show frame statistics and clock read-outs.
    pub debug: bool,
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            fog: FogSettings::default(),
            wind: WindSettings::default(),
            parameters: ParameterConfig::default(),
            routes: default_routes(),
            wind_signal: "windForce".to_string(),
            tree_colors: ColorStops::default(),
            trees: TreeLayout::default(),
            feed: FeedSettings::default(),
            debug: false,
        }
    }
}

impl CanopyConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Starting wind signal: the declared live value, or full wind.
    pub fn initial_wind_intensity(&self) -> f64 {
        self.parameters
            .live(&self.wind_signal)
            .map(|p| p.value)
            .unwrap_or(1.0)
    }

    pub fn parameter_router(&self) -> Result<ParameterRouter, ConfigError> {
        ParameterRouter::new(&self.routes, &self.parameters)
    }

    pub fn live_router(&self) -> LiveParameterRouter {
        LiveParameterRouter::new(&self.wind_signal)
    }

    /// Check everything that would otherwise fail later at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fog.validate()?;
        self.parameters.validate()?;
        self.parameter_router()?;
        self.tree_colors.validate()?;
        validate_interval(self.feed.interval_ms)?;
        // A scripted feed is read here so a bad path or script fails startup.
        build_feed(&self.feed, &self.parameters)?;

        let (lo, hi) = self.wind.mapping.time_increment.output();
        if lo < 0.0 || hi < 0.0 {
            return Err(ConfigError::InvalidSetting(format!(
                "wind time increment range [{lo}, {hi}] must not be negative"
            )));
        }
        let t = &self.trees;
        if !(t.spacing.is_finite() && t.spacing > 0.0) {
            return Err(ConfigError::InvalidSetting(format!(
                "tree spacing must be positive, got {}",
                t.spacing
            )));
        }
        if t.branch_levels == 0 || t.branch_levels > TreeLayout::MAX_BRANCH_LEVELS {
            return Err(ConfigError::InvalidSetting(format!(
                "tree branch_levels must be in 1..={}, got {}",
                TreeLayout::MAX_BRANCH_LEVELS,
                t.branch_levels
            )));
        }
        if !(0.0..=1.0).contains(&t.min_scale) {
            return Err(ConfigError::InvalidSetting(format!(
                "tree min_scale must be in [0, 1], got {}",
                t.min_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor_feed::FeedSource;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CanopyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let cfg = CanopyConfig::from_json("{}").unwrap();
        assert_eq!(cfg, CanopyConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let cfg = CanopyConfig::from_json(
            r#"{
                "debug": true,
                "fog": { "density": 0.002 },
                "feed": { "source": { "kind": "disabled" } }
            }"#,
        )
        .unwrap();
        assert!(cfg.debug);
        assert_eq!(cfg.fog.density, 0.002);
        assert_eq!(cfg.fog.octaves, 6);
        assert_eq!(cfg.feed.source, FeedSource::Disabled);
        assert_eq!(cfg.feed.interval_ms, 2000);
    }

    #[test]
    fn test_json_round_trip() {
        let cfg = CanopyConfig::default();
        let json = cfg.to_json().unwrap();
        assert_eq!(CanopyConfig::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn test_invalid_route_slot_fails_validation() {
        let cfg = CanopyConfig {
            routes: vec![RouteEntry {
                name: "no2".into(),
                slot: 9,
            }],
            ..CanopyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTreeSlot { index: 9, .. })
        ));
    }

    #[test]
    fn test_shared_route_slot_fails_validation() {
        let cfg = CanopyConfig {
            routes: vec![
                RouteEntry {
                    name: "no2".into(),
                    slot: 0,
                },
                RouteEntry {
                    name: "co".into(),
                    slot: 0,
                },
            ],
            ..CanopyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DuplicateRouteSlot { slot: 0, .. })
        ));
    }

    #[test]
    fn test_missing_feed_script_fails_validation() {
        let mut cfg = CanopyConfig::default();
        cfg.feed.source = FeedSource::Scripted {
            path: "/nonexistent/canopy-feed.json".into(),
            looping: false,
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_feed_script_fails_validation() {
        let path = std::env::temp_dir().join(format!("canopy_bad_feed_{}.json", std::process::id()));
        std::fs::write(&path, "{ not a list").unwrap();
        let mut cfg = CanopyConfig::default();
        cfg.feed.source = FeedSource::Scripted {
            path: path.clone(),
            looping: true,
        };
        let result = cfg.validate();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))), "got {result:?}");
    }

    #[test]
    fn test_semantic_errors_are_not_parse_errors() {
        let mut cfg = CanopyConfig::default();
        cfg.trees.spacing = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSetting(_))));
        let mut cfg = CanopyConfig::default();
        cfg.tree_colors.high = [2.0, 0.0, 0.0];
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSetting(_))));
    }

    #[test]
    fn test_short_feed_interval_fails_validation() {
        let mut cfg = CanopyConfig::default();
        cfg.feed.interval_ms = 1000;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::FeedIntervalTooShort { .. })
        ));
    }

    #[test]
    fn test_degenerate_wind_mapping_rejected_at_parse() {
        let json = r#"{ "wind": { "mapping": {
            "time_increment": { "input": [1.0, 1.0], "output": [0.0, 2.0] },
            "shader_strength": { "input": [0.0, 1.0], "output": [0.0005, 0.01] }
        } } }"#;
        assert!(CanopyConfig::from_json(json).is_err());
    }

    #[test]
    fn test_negative_time_increment_rejected() {
        let mut cfg = CanopyConfig::default();
        cfg.wind.mapping.time_increment =
            crate::value_mapper::ValueMapper::new((0.0, 1.0), (-1.0, 1.0)).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_initial_wind_from_live_parameter() {
        let mut cfg = CanopyConfig::default();
        assert_eq!(cfg.initial_wind_intensity(), 1.0);
        cfg.parameters.live_parameters[0].value = 0.4;
        assert_eq!(cfg.initial_wind_intensity(), 0.4);
        cfg.wind_signal = "gust".into();
        assert_eq!(cfg.initial_wind_intensity(), 1.0);
    }

    #[test]
    fn test_tree_layout_positions() {
        let layout = TreeLayout::default();
        assert_eq!(layout.slot_x(TreeSlot::ALL[0]), 0.0);
        assert_eq!(layout.slot_x(TreeSlot::ALL[2]), 400.0);
        assert_eq!(layout.middle_x(), 200.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CanopyConfig::load(Path::new("/nonexistent/canopy.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
