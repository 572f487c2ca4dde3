//! RecipeKit Settings Crate
//!
//! Handles application configuration, the settings bundle that supplies
//! preference defaults, and the observable preference store.

pub mod bundle;
pub mod config;
pub mod error;
pub mod persistence;
pub mod preferences;

pub use bundle::{PreferenceSpecifier, SettingsBundle, SpecifierKind};
pub use config::{Config, EventBusSettings, LoggingSettings, PreferenceSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
pub use persistence::PreferencesFile;
pub use preferences::{
    observe_initial, BackgroundTint, PreferenceChange, PreferenceObserver, PreferenceStore,
    PreferenceValue, UserPreferences, NAME_COLOR_KEY,
};
