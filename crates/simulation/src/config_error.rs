// ---------------------------------------------------------------------------
// ConfigError: setup-time failures for configuration and shader wiring
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised while loading configuration or wiring shaders at startup.
///
/// All of these are fatal: they are surfaced before the first frame renders.
/// Per-frame numeric edge cases are clamped locally and never reach this type.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error while reading a configuration or feed script file.
    Io(std::io::Error),
    /// JSON could not be parsed into the expected shape.
    Parse(String),
    /// A value mapping was declared with an empty or non-finite input range.
    DegenerateRange { min: f64, max: f64 },
    /// A color shader was registered at an index outside the tree slots.
    InvalidTreeSlot { index: usize, slots: usize },
    /// Two routes target the same parameter name.
    DuplicateRoute(String),
    /// Two parameter names route to the same tree slot.
    DuplicateRouteSlot { slot: usize, first: String, second: String },
    /// A numeric fog setting is outside its usable range.
    InvalidFogSetting { name: &'static str, value: f64 },
    /// The feed interval is too short for the feed timer.
    FeedIntervalTooShort { interval_ms: u64, minimum_ms: u64 },
    /// Well-formed JSON holding a value outside its allowed range.
    InvalidSetting(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::DegenerateRange { min, max } => write!(
                f,
                "Degenerate range: input range [{min}, {max}] must be finite and non-empty"
            ),
            ConfigError::InvalidTreeSlot { index, slots } => write!(
                f,
                "Invalid tree slot: index {index} is outside 0..{slots}"
            ),
            ConfigError::DuplicateRoute(name) => {
                write!(f, "Duplicate route for parameter '{name}'")
            }
            ConfigError::DuplicateRouteSlot {
                slot,
                first,
                second,
            } => write!(
                f,
                "Duplicate route slot: '{first}' and '{second}' both target tree slot {slot}"
            ),
            ConfigError::InvalidFogSetting { name, value } => {
                write!(f, "Invalid fog setting: {name} = {value}")
            }
            ConfigError::FeedIntervalTooShort {
                interval_ms,
                minimum_ms,
            } => write!(
                f,
                "Feed interval too short: {interval_ms} ms, must be greater than {minimum_ms} ms"
            ),
            ConfigError::InvalidSetting(msg) => write!(f, "Invalid setting: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
