//! Errors for configuration, preference files and settings bundles.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that can go wrong reading or writing settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A bundle entry or stored preference has an unusable value.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Cannot create settings directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Cannot encode TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SettingsError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Problems with the shape or contents of the app configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("'{0}' must be set")]
    MissingKey(String),

    /// Only `.toml` and `.json` are understood.
    #[error("Unsupported config format '{0}'")]
    UnsupportedFormat(String),

    #[error("'{key}' cannot be {value}")]
    ValueOutOfRange { key: String, value: String },

    #[error("Unreadable contents: {0}")]
    Corrupted(String),

    /// `dirs` found no config directory for this OS.
    #[error("No config directory on {0}")]
    UnsupportedPlatform(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = SettingsError::read(
            "/tmp/preferences.json",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "Cannot read /tmp/preferences.json: gone");

        let err = SettingsError::InvalidSetting {
            key: "nameColorKey".to_string(),
            reason: "must be an integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'nameColorKey': must be an integer"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: SettingsError = ConfigError::ValueOutOfRange {
            key: "event_bus.channel_capacity".to_string(),
            value: "0".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "'event_bus.channel_capacity' cannot be 0");
        assert!(matches!(err, SettingsError::Config(_)));
    }
}
