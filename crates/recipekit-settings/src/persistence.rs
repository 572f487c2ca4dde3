//! On-disk format of persisted preferences.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{ConfigError, SettingsError, SettingsResult};
use crate::preferences::PreferenceValue;

/// Current preferences file format version
pub const FORMAT_VERSION: u32 = 1;

/// Explicit preference values as stored in `preferences.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesFile {
    pub version: u32,
    #[serde(default)]
    pub values: BTreeMap<String, PreferenceValue>,
}

impl PreferencesFile {
    pub fn new(values: BTreeMap<String, PreferenceValue>) -> Self {
        Self {
            version: FORMAT_VERSION,
            values,
        }
    }

    /// `<config dir>/recipekit/preferences.json`
    pub fn default_path() -> SettingsResult<PathBuf> {
        Ok(Config::config_dir()?.join("preferences.json"))
    }

    /// Read and check a preferences file
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::read(path, e))?;
        let file: Self = serde_json::from_str(&content)?;

        if file.version > FORMAT_VERSION {
            return Err(ConfigError::Corrupted(format!(
                "{} has format version {}, newest known is {}",
                path.display(),
                file.version,
                FORMAT_VERSION
            ))
            .into());
        }

        Ok(file)
    }

    /// Write the file, replacing any previous one
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Directory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, content)
            .map_err(|e| SettingsError::write(&staging, e))?;
        std::fs::rename(&staging, path)
            .map_err(|e| SettingsError::write(path, e))?;

        Ok(())
    }
}
