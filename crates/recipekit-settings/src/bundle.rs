//! Settings bundle: the declarative list of user-facing preferences.
//!
//! A bundle is a TOML document of `[[preference_specifiers]]` entries. Every
//! entry that names a key and a default value contributes that default to
//! the preference store at launch. Group headers and other keyless entries
//! only exist for presentation and are skipped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{SettingsError, SettingsResult};
use crate::preferences::{PreferenceStore, PreferenceValue, NAME_COLOR_KEY};

const BUILTIN_BUNDLE: &str = r#"
[[preference_specifiers]]
type = "group"
title = "Appearance"

[[preference_specifiers]]
type = "multi_value"
title = "Recipe Name Color"
key = "nameColorKey"
default_value = 1
titles = ["Blue", "Teal", "Indigo"]
values = [1, 2, 3]
"#;

/// Kind of a settings entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecifierKind {
    Group,
    MultiValue,
    Toggle,
    TextField,
    Slider,
    TitleValue,
}

/// One entry of a settings bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSpecifier {
    #[serde(rename = "type")]
    pub kind: SpecifierKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<PreferenceValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<PreferenceValue>,
}

impl PreferenceSpecifier {
    /// Display title for `value` in a multi-value picker
    pub fn title_for(&self, value: &PreferenceValue) -> Option<&str> {
        self.values
            .iter()
            .position(|candidate| candidate == value)
            .and_then(|index| self.titles.get(index))
            .map(String::as_str)
    }
}

/// Parsed settings bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsBundle {
    #[serde(default)]
    pub preference_specifiers: Vec<PreferenceSpecifier>,
}

impl SettingsBundle {
    /// The bundle shipped with the app
    pub fn builtin() -> SettingsResult<Self> {
        Self::from_toml_str(BUILTIN_BUNDLE)
    }

    /// Parse a bundle from TOML text
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let bundle: Self = toml::from_str(content)?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Load a bundle file (usually `Root.toml`)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::read(path, e))?;
        Self::from_toml_str(&content)
    }

    /// The builtin bundle, or the file at `path` when given
    pub fn load_or_builtin(path: Option<&Path>) -> SettingsResult<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::builtin(),
        }
    }

    fn validate(&self) -> SettingsResult<()> {
        for entry in &self.preference_specifiers {
            let Some(key) = entry.key.as_deref() else {
                continue;
            };

            if entry.kind == SpecifierKind::MultiValue && entry.titles.len() != entry.values.len() {
                return Err(SettingsError::InvalidSetting {
                    key: key.to_string(),
                    reason: format!(
                        "{} titles for {} values",
                        entry.titles.len(),
                        entry.values.len()
                    ),
                });
            }

            if let Some(default) = &entry.default_value {
                if !entry.values.is_empty() && !entry.values.contains(default) {
                    tracing::warn!(
                        "Default {} for '{}' is not one of its listed values",
                        default,
                        key
                    );
                }
            }
        }
        Ok(())
    }

    /// Entry for `key`
    pub fn specifier(&self, key: &str) -> Option<&PreferenceSpecifier> {
        self.preference_specifiers
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
    }

    /// Defaults of every keyed entry
    pub fn defaults(&self) -> BTreeMap<String, PreferenceValue> {
        self.preference_specifiers
            .iter()
            .filter_map(|entry| match (&entry.key, &entry.default_value) {
                (Some(key), Some(value)) => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Register this bundle's defaults; returns how many were registered.
    pub fn register_into(&self, store: &dyn PreferenceStore) -> usize {
        let defaults = self.defaults();
        let count = defaults.len();
        store.register_defaults(defaults);
        tracing::debug!("Registered {} preference default(s)", count);
        count
    }

    /// Title of the current recipe name color choice
    pub fn name_color_title(&self, store: &dyn PreferenceStore) -> Option<String> {
        let value = store.get(NAME_COLOR_KEY)?;
        self.specifier(NAME_COLOR_KEY)?
            .title_for(&value)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::UserPreferences;

    #[test]
    fn test_builtin_bundle() {
        let bundle = SettingsBundle::builtin().expect("builtin parses");
        assert_eq!(bundle.preference_specifiers.len(), 2);
        assert_eq!(bundle.preference_specifiers[0].kind, SpecifierKind::Group);

        let defaults = bundle.defaults();
        assert_eq!(defaults.len(), 1);
        assert_eq!(
            defaults.get(NAME_COLOR_KEY),
            Some(&PreferenceValue::Integer(1))
        );
    }

    #[test]
    fn test_register_into_store() {
        let bundle = SettingsBundle::builtin().expect("builtin parses");
        let prefs = UserPreferences::new();
        assert_eq!(bundle.register_into(&prefs), 1);
        assert_eq!(prefs.integer(NAME_COLOR_KEY), 1);
        assert!(prefs.persisted_values().is_empty());
        assert_eq!(bundle.name_color_title(&prefs).as_deref(), Some("Blue"));

        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(3));
        assert_eq!(bundle.name_color_title(&prefs).as_deref(), Some("Indigo"));
    }

    #[test]
    fn test_entries_without_key_or_default_are_skipped() {
        let bundle = SettingsBundle::from_toml_str(
            r#"
            [[preference_specifiers]]
            type = "group"
            title = "General"

            [[preference_specifiers]]
            type = "title_value"
            title = "Version"
            key = "version"

            [[preference_specifiers]]
            type = "toggle"
            title = "Compact"
            key = "compact"
            default_value = false
            "#,
        )
        .expect("valid bundle");

        let defaults = bundle.defaults();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults.get("compact"), Some(&PreferenceValue::Bool(false)));
    }

    #[test]
    fn test_mismatched_titles_are_rejected() {
        let err = SettingsBundle::from_toml_str(
            r#"
            [[preference_specifiers]]
            type = "multi_value"
            key = "size"
            default_value = 1
            titles = ["Small"]
            values = [1, 2]
            "#,
        )
        .expect_err("mismatch");
        assert!(matches!(err, SettingsError::InvalidSetting { ref key, .. } if key == "size"));
    }

    #[test]
    fn test_empty_document_has_no_defaults() {
        let bundle = SettingsBundle::from_toml_str("").expect("empty bundle");
        assert!(bundle.defaults().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("Root.toml");
        std::fs::write(&path, BUILTIN_BUNDLE).expect("write");

        let bundle = SettingsBundle::load_or_builtin(Some(&path)).expect("load");
        assert_eq!(bundle, SettingsBundle::builtin().expect("builtin"));
    }
}
