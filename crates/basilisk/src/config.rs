//! Runtime configuration.
//!
//! Loaded once at startup from TOML; nothing here is re-read at runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use basilisk_event::EventKind;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML source failed to parse.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Key-repeat settings in milliseconds.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyRepeatConfig {
    /// Initial delay before the first repeat; zero disables repeat.
    pub delay: i32,
    /// Interval between repeats; zero falls back to the delay.
    pub interval: i32,
}

/// Engine runtime configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Target frame rate for the host's animation callback.
    pub frame_rate: u32,
    /// Key-repeat settings.
    pub key_repeat: KeyRepeatConfig,
    /// Startup allow-list of event kinds; `None` keeps every standard
    /// kind allowed.
    pub allowed_events: Option<Vec<EventKind>>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 60,
            key_repeat: KeyRepeatConfig::default(),
            allowed_events: None,
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}
