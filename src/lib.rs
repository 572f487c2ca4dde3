//! # RecipeKit
//!
//! A headless recipe browser built around a typed event bus.
//!
//! ## Architecture
//!
//! RecipeKit is organized as a workspace with multiple crates:
//!
//! 1. **recipekit-core** - Errors, recipe model, data store, subscriber registry, event bus
//! 2. **recipekit-settings** - App config, settings bundle, observable preferences
//! 3. **recipekit-ui** - Detail presenter, render model, menu bar, toolbar, inline buttons
//! 4. **recipekit** - Application wiring and the main binary
//!
//! ## Flow
//!
//! - Command surfaces publish `AppEvent`s on the injected `EventBus`
//! - The detail presenter reacts, writes through the `DataStore`, and
//!   re-resolves its selection by identity whenever the store changes
//! - The `nameColorKey` preference tints the recipe title

pub mod app;

pub use app::{Platform, RecipesApp};

pub use recipekit_core::{
    ActivityItemsConfiguration, AppEvent, CommandSource, DataStore, Error, EventBus, EventKind,
    InMemoryDataStore, Recipe, RecipeAction, RecipeId, Result, Subscription,
};

pub use recipekit_settings::{
    BackgroundTint, Config, LoggingSettings, PreferenceStore, PreferenceValue, SettingsBundle,
    UserPreferences, NAME_COLOR_KEY,
};

pub use recipekit_ui::{
    CommandSurface, DetailRender, InlineButtons, MenuBar, MenuBuilder, MenuSystem, Modifier,
    RecipeDetailPresenter, Toolbar, ToolbarItemIdentifier,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging
///
/// Sets up structured logging with:
/// - `RUST_LOG` environment variable support, falling back to `settings.level`
/// - Pretty console output, or JSON lines when `settings.json` is set
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)?,
    };

    if settings.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
