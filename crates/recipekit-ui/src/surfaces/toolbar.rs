//! Window toolbar (desktop idiom only).

use parking_lot::RwLock;
use recipekit_core::{
    ActivityItemsConfiguration, AppEvent, CommandSource, EventBus, EventKind, RecipeAction,
    Subscription,
};
use serde::Serialize;
use std::sync::Arc;

use super::CommandSurface;

/// Toolbar item identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolbarItemIdentifier {
    ToggleSidebar,
    FlexibleSpace,
    EditRecipe,
    ToggleRecipeIsFavorite,
    ShareRecipe,
}

impl ToolbarItemIdentifier {
    pub fn name(self) -> &'static str {
        match self {
            ToolbarItemIdentifier::ToggleSidebar => "toggleSidebar",
            ToolbarItemIdentifier::FlexibleSpace => "flexibleSpace",
            ToolbarItemIdentifier::EditRecipe => "editRecipe",
            ToolbarItemIdentifier::ToggleRecipeIsFavorite => "toggleRecipeIsFavorite",
            ToolbarItemIdentifier::ShareRecipe => "shareRecipe",
        }
    }
}

impl std::fmt::Display for ToolbarItemIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

static DEFAULT_ITEMS: [ToolbarItemIdentifier; 5] = [
    ToolbarItemIdentifier::ToggleSidebar,
    ToolbarItemIdentifier::FlexibleSpace,
    ToolbarItemIdentifier::EditRecipe,
    ToolbarItemIdentifier::ToggleRecipeIsFavorite,
    ToolbarItemIdentifier::ShareRecipe,
];

/// A concrete toolbar item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarItem {
    pub identifier: ToolbarItemIdentifier,
    pub label: Option<&'static str>,
    pub symbol: Option<&'static str>,
    pub action: Option<RecipeAction>,
    /// Share payload; only set on the share item
    pub activity_items: Option<ActivityItemsConfiguration>,
}

impl ToolbarItem {
    fn plain(identifier: ToolbarItemIdentifier) -> Self {
        Self {
            identifier,
            label: None,
            symbol: None,
            action: None,
            activity_items: None,
        }
    }

    fn command(
        identifier: ToolbarItemIdentifier,
        label: &'static str,
        symbol: &'static str,
        action: RecipeAction,
    ) -> Self {
        Self {
            label: Some(label),
            symbol: Some(symbol),
            action: Some(action),
            ..Self::plain(identifier)
        }
    }
}

/// Toolbar of the main window.
///
/// The share item follows the latest `ActivityItemsConfigurationDidChange`
/// payload through the toolbar's own bus subscription.
pub struct Toolbar {
    bus: Arc<EventBus>,
    share: Arc<RwLock<Option<ActivityItemsConfiguration>>>,
    _share_subscription: Subscription,
}

impl Toolbar {
    pub fn new(bus: Arc<EventBus>) -> Self {
        let share = Arc::new(RwLock::new(None));
        let slot = Arc::clone(&share);
        let subscription = bus.on(
            EventKind::ActivityItemsConfigurationDidChange,
            move |event: &AppEvent| {
                if let AppEvent::ActivityItemsConfigurationDidChange { configuration } = event {
                    *slot.write() = configuration.clone();
                }
                Ok(())
            },
        );

        Self {
            bus,
            share,
            _share_subscription: subscription,
        }
    }

    pub fn default_item_identifiers(&self) -> &'static [ToolbarItemIdentifier] {
        &DEFAULT_ITEMS
    }

    pub fn allowed_item_identifiers(&self) -> &'static [ToolbarItemIdentifier] {
        self.default_item_identifiers()
    }

    /// Build the item for `identifier`; the flexible space has none
    pub fn item(&self, identifier: ToolbarItemIdentifier) -> Option<ToolbarItem> {
        match identifier {
            ToolbarItemIdentifier::ToggleSidebar => Some(ToolbarItem::plain(identifier)),
            ToolbarItemIdentifier::EditRecipe => Some(ToolbarItem::command(
                identifier,
                "Edit Recipe",
                "square.and.pencil",
                RecipeAction::Edit,
            )),
            ToolbarItemIdentifier::ToggleRecipeIsFavorite => Some(ToolbarItem::command(
                identifier,
                "Toggle Favorite",
                "heart",
                RecipeAction::ToggleFavorite,
            )),
            ToolbarItemIdentifier::ShareRecipe => Some(ToolbarItem {
                activity_items: self.share_configuration(),
                ..ToolbarItem::plain(identifier)
            }),
            ToolbarItemIdentifier::FlexibleSpace => None,
        }
    }

    /// Items in default order
    pub fn items(&self) -> Vec<ToolbarItem> {
        self.default_item_identifiers()
            .iter()
            .filter_map(|identifier| self.item(*identifier))
            .collect()
    }

    /// Click an item; items without an action publish nothing
    pub fn activate(&self, identifier: ToolbarItemIdentifier) -> usize {
        match self.item(identifier).and_then(|item| item.action) {
            Some(action) => self.send(action),
            None => {
                tracing::trace!("Toolbar item {} has no command", identifier);
                0
            }
        }
    }

    /// What the share item would currently share
    pub fn share_configuration(&self) -> Option<ActivityItemsConfiguration> {
        self.share.read().clone()
    }
}

impl CommandSurface for Toolbar {
    fn source(&self) -> CommandSource {
        CommandSource::Toolbar
    }

    fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl std::fmt::Debug for Toolbar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolbar")
            .field("share", &*self.share.read())
            .finish()
    }
}
