//! Application wiring.
//!
//! [`RecipesApp`] plays the role of the app delegate: it registers the
//! settings bundle defaults, restores persisted preferences, and connects
//! the data store, the event bus, the detail presenter and the command
//! surfaces of the current platform.

use anyhow::Context;
use recipekit_core::{
    DataStore, EventBus, EventKind, InMemoryDataStore, Recipe, RecipeId, Subscription,
    SubscriptionSet,
};
use recipekit_settings::{Config, PreferenceStore, SettingsBundle, UserPreferences};
use recipekit_ui::{
    InlineButtons, MenuBar, MenuBuilder, MenuSystem, RecipeDetailPresenter, Toolbar,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Weak};

/// Title given to recipes created from the "New Recipe" command
pub const NEW_RECIPE_TITLE: &str = "New Recipe";

/// Device idiom the app runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Phone,
    Pad,
    MacCatalyst,
}

impl Platform {
    /// Only the desktop idiom has a window toolbar
    pub fn has_toolbar(self) -> bool {
        self == Platform::MacCatalyst
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Phone => "phone",
            Platform::Pad => "pad",
            Platform::MacCatalyst => "mac-catalyst",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phone" | "ios" => Ok(Platform::Phone),
            "pad" | "ipad" => Ok(Platform::Pad),
            "mac" | "mac-catalyst" | "catalyst" => Ok(Platform::MacCatalyst),
            other => Err(anyhow::anyhow!("Unknown platform '{}'", other)),
        }
    }
}

/// A running application
pub struct RecipesApp {
    config: Config,
    platform: Platform,
    bus: Arc<EventBus>,
    store: Arc<InMemoryDataStore>,
    preferences: Arc<UserPreferences>,
    bundle: SettingsBundle,
    presenter: Arc<RecipeDetailPresenter>,
    menu_bar: MenuBar,
    menus: MenuBuilder,
    toolbar: Option<Toolbar>,
    buttons: InlineButtons,
    subscriptions: SubscriptionSet,
    preferences_path: Option<PathBuf>,
}

impl RecipesApp {
    /// Launch with the sample recipes
    pub fn launch(config: Config, platform: Platform) -> anyhow::Result<Self> {
        Self::launch_with_store(config, platform, InMemoryDataStore::sample())
    }

    /// Launch over an existing store
    pub fn launch_with_store(
        config: Config,
        platform: Platform,
        store: InMemoryDataStore,
    ) -> anyhow::Result<Self> {
        config.validate().context("Invalid configuration")?;
        tracing::info!("Launching RecipeKit {} as {}", crate::VERSION, platform);

        let preferences = Arc::new(UserPreferences::new());
        let bundle = SettingsBundle::load_or_builtin(config.preferences.bundle.as_deref())
            .context("Failed to load settings bundle")?;
        bundle.register_into(preferences.as_ref());

        let preferences_path = match config.preferences_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("No preferences location: {}", e);
                None
            }
        };
        if let Some(path) = preferences_path.as_deref().filter(|p| p.exists()) {
            if let Err(e) = preferences.load_from_file(path) {
                tracing::warn!("Ignoring unreadable preferences: {}", e);
            }
        }

        let bus = Arc::new(EventBus::with_config(config.event_bus.to_bus_config()));
        let store = Arc::new(store);
        let presenter = Arc::new(RecipeDetailPresenter::attach(
            Arc::clone(&bus),
            Arc::clone(&store) as Arc<dyn DataStore>,
            Arc::clone(&preferences) as Arc<dyn PreferenceStore>,
        ));

        let menu_bar = MenuBar::new(Arc::clone(&bus));
        let mut menus = MenuBuilder::new(MenuSystem::Main);
        menu_bar.build_menu(&mut menus);

        let toolbar = platform
            .has_toolbar()
            .then(|| Toolbar::new(Arc::clone(&bus)));
        let buttons = InlineButtons::new(Arc::clone(&bus));

        let subscriptions = SubscriptionSet::new();
        subscriptions.push(Self::subscribe_new_recipe(
            &bus,
            Arc::clone(&store),
            Arc::downgrade(&presenter),
        ));

        tracing::info!(
            "Ready: {} recipes, {} bus subscribers",
            store.len(),
            bus.subscriber_count()
        );

        Ok(Self {
            config,
            platform,
            bus,
            store,
            preferences,
            bundle,
            presenter,
            menu_bar,
            menus,
            toolbar,
            buttons,
            subscriptions,
            preferences_path,
        })
    }

    fn subscribe_new_recipe(
        bus: &EventBus,
        store: Arc<InMemoryDataStore>,
        presenter: Weak<RecipeDetailPresenter>,
    ) -> Subscription {
        bus.on(EventKind::NewRecipe, move |event| {
            let recipe = store.add(Recipe::new(NEW_RECIPE_TITLE));
            tracing::info!(
                "Created recipe {} from {}",
                recipe.id,
                event
                    .source()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            if let Some(presenter) = presenter.upgrade() {
                presenter.set_selection(Some(recipe.id));
            }
            Ok(())
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<InMemoryDataStore> {
        &self.store
    }

    pub fn preferences(&self) -> &Arc<UserPreferences> {
        &self.preferences
    }

    pub fn bundle(&self) -> &SettingsBundle {
        &self.bundle
    }

    pub fn presenter(&self) -> &RecipeDetailPresenter {
        &self.presenter
    }

    pub fn menu_bar(&self) -> &MenuBar {
        &self.menu_bar
    }

    /// The built main menu
    pub fn menus(&self) -> &MenuBuilder {
        &self.menus
    }

    /// The window toolbar; only present on the desktop idiom
    pub fn toolbar(&self) -> Option<&Toolbar> {
        self.toolbar.as_ref()
    }

    pub fn buttons(&self) -> &InlineButtons {
        &self.buttons
    }

    /// Select a recipe in the detail pane
    pub fn select(&self, id: Option<RecipeId>) {
        self.presenter.set_selection(id);
    }

    /// Close the presenter, release app subscriptions and persist
    /// preferences when configured to.
    pub fn shutdown(self) -> anyhow::Result<()> {
        self.presenter.close();
        self.subscriptions.release_all();

        if self.config.preferences.persist {
            if let Some(path) = &self.preferences_path {
                self.preferences
                    .save_to_file(path)
                    .with_context(|| format!("Failed to save {}", path.display()))?;
            }
        }

        tracing::info!(
            "Shut down with {} recorded handler failure(s)",
            self.bus.failure_count()
        );
        Ok(())
    }
}

impl std::fmt::Debug for RecipesApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipesApp")
            .field("platform", &self.platform)
            .field("store", &self.store)
            .field("presenter", &self.presenter)
            .field("toolbar", &self.toolbar.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("ipad".parse::<Platform>().ok(), Some(Platform::Pad));
        assert_eq!("Mac".parse::<Platform>().ok(), Some(Platform::MacCatalyst));
        assert!("watch".parse::<Platform>().is_err());
        assert!(Platform::MacCatalyst.has_toolbar());
        assert!(!Platform::Phone.has_toolbar());
    }
}
