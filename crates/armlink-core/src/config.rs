use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_tick_ms() -> u64 {
    16
}

// ---------------------------------------------------------------------------
// StationConfig
// ---------------------------------------------------------------------------

/// Station configuration loaded from a TOML file.
///
/// Controls the tick cadence of the headless driver and the documents
/// loaded at startup. Every field has a default, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Resource)]
pub struct StationConfig {
    /// Scheduler tick period in milliseconds (default: 16 ≈ 60 Hz).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Arm configuration document to load at startup (JSON).
    #[serde(default)]
    pub arm_config: Option<PathBuf>,

    /// Sequence document to load at startup (JSON).
    #[serde(default)]
    pub sequence: Option<PathBuf>,

    /// Mapping document to load at startup (JSON).
    #[serde(default)]
    pub mappings: Option<PathBuf>,

    /// Whether playback loops when it reaches the end.
    #[serde(default)]
    pub loop_playback: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            arm_config: None,
            sequence: None,
            mappings: None,
            loop_playback: false,
        }
    }
}

impl StationConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidTickMs(self.tick_ms));
        }
        Ok(())
    }

    /// Tick rate in Hz.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tick_hz(&self) -> f64 {
        1000.0 / self.tick_ms as f64
    }

    /// Load from a TOML file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = StationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_ms, 16);
        assert!(config.arm_config.is_none());
    }

    #[test]
    fn zero_tick_rejected() {
        let config = StationConfig {
            tick_ms: 0,
            ..StationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTickMs(0))
        ));
    }

    #[test]
    fn tick_hz_from_period() {
        let config = StationConfig {
            tick_ms: 20,
            ..StationConfig::default()
        };
        assert!((config.tick_hz() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: StationConfig = toml::from_str("").unwrap();
        assert_eq!(config, StationConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config: StationConfig = toml::from_str(
            r#"
            tick_ms = 8
            loop_playback = true
            sequence = "wave.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.tick_ms, 8);
        assert!(config.loop_playback);
        assert_eq!(config.sequence, Some(PathBuf::from("wave.json")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = StationConfig::from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
