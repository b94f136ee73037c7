//! Runtime configuration loaded from a TOML file.
//!
//! The file is optional. Every field has a default, so an empty or missing
//! file yields the stock WASD profile with a 16ms tick. The configuration is
//! only ever read; nothing in the crate writes it back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV_VAR: &str = "REVERSEJOY_CONFIG";

const CONFIG_DIR_NAME: &str = "reversejoy";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Mouse counts to stick units; high because a single count should move the stick visibly.
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 16000.0;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// User-tunable settings for the translation pipeline.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Multiplier applied to each raw mouse count before it reaches the right stick
    pub mouse_sensitivity: f32,

    /// Period of the cadence timer in milliseconds
    pub tick_interval_ms: u64,

    /// Mirror movement keys onto the D-pad bits alongside the left stick
    pub dpad_mirror: bool,

    /// Start with translation disabled (input flows to the OS untouched)
    pub start_in_passthrough: bool,

    /// Maximum log level: trace, debug, info, warn or error
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            dpad_mirror: true,
            start_in_passthrough: false,
            log_level: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Loads from `$REVERSEJOY_CONFIG` if set, else from the platform config directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mouse_sensitivity.is_finite() || self.mouse_sensitivity <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mouse_sensitivity must be a positive number, got {}",
                self.mouse_sensitivity
            )));
        }

        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "tick_interval_ms must be within 1..={}, got {}",
                MAX_TICK_INTERVAL_MS, self.tick_interval_ms
            )));
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = RuntimeConfig::from_toml_str(
            "mouse_sensitivity = 250.0\ndpad_mirror = false\n",
        )
        .unwrap();
        assert_eq!(config.mouse_sensitivity, 250.0);
        assert!(!config.dpad_mirror);
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn rejects_non_positive_sensitivity() {
        let err = RuntimeConfig::from_toml_str("mouse_sensitivity = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_tick() {
        assert!(RuntimeConfig::from_toml_str("tick_interval_ms = 0").is_err());
        assert!(RuntimeConfig::from_toml_str("tick_interval_ms = 5000").is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = RuntimeConfig::from_toml_str("log_level = \"chatty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = RuntimeConfig::from_toml_str("tick_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("reversejoy-does-not-exist/config.toml");
        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }
}
