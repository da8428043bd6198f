//! Editor configuration.
//!
//! Defaults live in `DEFAULT_*` constants. [`EditorConfig::from_env`] overrides
//! them from `TOPO_*` environment variables; a variable that is set but does
//! not parse is an error rather than a silent fallback.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use frames::ClientId;

const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;
const DEFAULT_CLIENT_ID: ClientId = 0;
const DEFAULT_TRANSITION_LOG_CAPACITY: usize = 512;
const DEFAULT_HISTORY_LIMIT: usize = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid { key: &'static str, expected: &'static str, value: String },
    #[error("{key} is not valid unicode")]
    NotUnicode { key: &'static str },
}

/// Tuning knobs for one editor instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Drawing surface width in screen pixels.
    pub width: f64,
    /// Drawing surface height in screen pixels.
    pub height: f64,
    /// Client id to stamp with before the relay assigns one.
    pub client_id: ClientId,
    /// Recorded transitions kept for inspection; oldest dropped first.
    pub transition_log_capacity: usize,
    /// Undo entries kept; oldest dropped first.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
            client_id: DEFAULT_CLIENT_ID,
            transition_log_capacity: DEFAULT_TRANSITION_LOG_CAPACITY,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by `TOPO_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            width: env_parse("TOPO_VIEWPORT_WIDTH", "number", DEFAULT_VIEWPORT_WIDTH)?,
            height: env_parse("TOPO_VIEWPORT_HEIGHT", "number", DEFAULT_VIEWPORT_HEIGHT)?,
            client_id: env_parse("TOPO_CLIENT_ID", "integer", DEFAULT_CLIENT_ID)?,
            transition_log_capacity: env_parse("TOPO_TRANSITION_LOG", "integer", DEFAULT_TRANSITION_LOG_CAPACITY)?,
            history_limit: env_parse("TOPO_HISTORY_LIMIT", "integer", DEFAULT_HISTORY_LIMIT)?,
        })
    }
}

pub(crate) fn env_parse<T>(key: &'static str, expected: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, expected, value }),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { key }),
    }
}
