//! Configuration management for RecipeKit
//!
//! Provides the application configuration file, its defaults and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Event bus tuning (broadcast capacity, history, failure log)
//! - Preference storage (file locations, persistence switch)
//! - Logging (level, output format)

use recipekit_core::EventBusConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Application directory name under the platform config dir
pub const APP_DIR_NAME: &str = "recipekit";

/// Event bus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusSettings {
    /// Capacity of the async broadcast channel
    pub channel_capacity: usize,
    /// Keep a history of published events
    pub enable_history: bool,
    /// Maximum number of events kept in history
    pub max_history_size: usize,
    /// How long events stay in history, in seconds
    pub history_retention_secs: u64,
    /// How many handler failures to keep for inspection
    pub max_recorded_failures: usize,
}

impl Default for EventBusSettings {
    fn default() -> Self {
        let defaults = EventBusConfig::default();
        Self {
            channel_capacity: defaults.channel_capacity,
            enable_history: defaults.enable_history,
            max_history_size: defaults.max_history_size,
            history_retention_secs: defaults.history_retention.as_secs(),
            max_recorded_failures: defaults.max_recorded_failures,
        }
    }
}

impl EventBusSettings {
    /// Convert to the event bus runtime configuration
    pub fn to_bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            channel_capacity: self.channel_capacity,
            enable_history: self.enable_history,
            max_history_size: self.max_history_size,
            history_retention: Duration::from_secs(self.history_retention_secs),
            max_recorded_failures: self.max_recorded_failures,
        }
    }
}

/// Where preferences and the settings bundle live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSettings {
    /// Preferences file; defaults to `<config dir>/recipekit/preferences.json`
    pub file: Option<PathBuf>,
    /// Settings bundle; the built-in bundle is used when absent
    pub bundle: Option<PathBuf>,
    /// Write explicit preference values back on shutdown
    pub persist: bool,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            file: None,
            bundle: None,
            persist: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level directive (`RUST_LOG` still takes precedence)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Event bus settings
    pub event_bus: EventBusSettings,
    /// Preference storage
    pub preferences: PreferenceSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config directory for RecipeKit
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| {
                ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
            })
    }

    /// Default location of the config file
    pub fn default_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::read(path, e))?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the config at `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Directory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::write(path, e))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_bus.channel_capacity == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "event_bus.channel_capacity".to_string(),
                value: "0".to_string(),
            });
        }

        if self.event_bus.enable_history && self.event_bus.max_history_size == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "event_bus.max_history_size".to_string(),
                value: "0".to_string(),
            });
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingKey("logging.level".to_string()));
        }

        Ok(())
    }

    /// Resolved preferences file path
    pub fn preferences_path(&self) -> SettingsResult<PathBuf> {
        match &self.preferences.file {
            Some(path) => Ok(path.clone()),
            None => crate::persistence::PreferencesFile::default_path(),
        }
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
