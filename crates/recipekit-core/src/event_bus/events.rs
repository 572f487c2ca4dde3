//! Event type definitions for the event bus.
//!
//! Every command a surface can issue is a variant of [`AppEvent`], carrying
//! the [`CommandSource`] that published it. Events are cloneable and
//! serializable for logging/replay.

use serde::{Deserialize, Serialize};

use super::registry::Describe;
use crate::data::Recipe;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum AppEvent {
    /// Open the editor for the selected recipe.
    EditRecipe {
        /// Surface that issued the command.
        source: CommandSource,
    },
    /// Flip the favorite flag of the selected recipe.
    ToggleRecipeIsFavorite {
        /// Surface that issued the command.
        source: CommandSource,
    },
    /// Ask to delete the selected recipe (subject to confirmation).
    DeleteRecipe {
        /// Surface that issued the command.
        source: CommandSource,
    },
    /// Create a new recipe.
    NewRecipe {
        /// Surface that issued the command.
        source: CommandSource,
    },
    /// The share payload for the current selection changed.
    ActivityItemsConfigurationDidChange {
        /// `None` when nothing is selected.
        configuration: Option<ActivityItemsConfiguration>,
    },
}

impl AppEvent {
    /// Get the kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::EditRecipe { .. } => EventKind::EditRecipe,
            AppEvent::ToggleRecipeIsFavorite { .. } => EventKind::ToggleRecipeIsFavorite,
            AppEvent::DeleteRecipe { .. } => EventKind::DeleteRecipe,
            AppEvent::NewRecipe { .. } => EventKind::NewRecipe,
            AppEvent::ActivityItemsConfigurationDidChange { .. } => {
                EventKind::ActivityItemsConfigurationDidChange
            }
        }
    }

    /// Surface that published a command event; `None` for state-change events
    pub fn source(&self) -> Option<CommandSource> {
        match self {
            AppEvent::EditRecipe { source }
            | AppEvent::ToggleRecipeIsFavorite { source }
            | AppEvent::DeleteRecipe { source }
            | AppEvent::NewRecipe { source } => Some(*source),
            AppEvent::ActivityItemsConfigurationDidChange { .. } => None,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::ActivityItemsConfigurationDidChange { configuration } => {
                match configuration {
                    Some(config) => format!("{} ({})", self.kind(), config.title),
                    None => format!("{} (cleared)", self.kind()),
                }
            }
            _ => match self.source() {
                Some(source) => format!("{} from {}", self.kind(), source),
                None => self.kind().to_string(),
            },
        }
    }
}

impl Describe for AppEvent {
    fn describe(&self) -> String {
        self.description()
    }
}

/// Payload-free event discriminant, used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// See [`AppEvent::EditRecipe`].
    EditRecipe,
    /// See [`AppEvent::ToggleRecipeIsFavorite`].
    ToggleRecipeIsFavorite,
    /// See [`AppEvent::DeleteRecipe`].
    DeleteRecipe,
    /// See [`AppEvent::NewRecipe`].
    NewRecipe,
    /// See [`AppEvent::ActivityItemsConfigurationDidChange`].
    ActivityItemsConfigurationDidChange,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [EventKind; 5] = [
        EventKind::EditRecipe,
        EventKind::ToggleRecipeIsFavorite,
        EventKind::DeleteRecipe,
        EventKind::NewRecipe,
        EventKind::ActivityItemsConfigurationDidChange,
    ];

    /// Stable event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::EditRecipe => "editRecipe",
            EventKind::ToggleRecipeIsFavorite => "toggleRecipeIsFavorite",
            EventKind::DeleteRecipe => "deleteRecipe",
            EventKind::NewRecipe => "newRecipe",
            EventKind::ActivityItemsConfigurationDidChange => {
                "activityItemsConfigurationDidChange"
            }
        }
    }

    /// Look a kind up by its stable name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of affordance a command came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandSource {
    /// Menu bar item or its key equivalent.
    MenuBar,
    /// Window toolbar item.
    Toolbar,
    /// Button inside the detail view.
    InlineButton,
    /// The detail presenter itself.
    Presenter,
    /// Application-level code.
    App,
}

impl std::fmt::Display for CommandSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandSource::MenuBar => write!(f, "menu bar"),
            CommandSource::Toolbar => write!(f, "toolbar"),
            CommandSource::InlineButton => write!(f, "inline button"),
            CommandSource::Presenter => write!(f, "presenter"),
            CommandSource::App => write!(f, "app"),
        }
    }
}

/// A user-level command that any surface can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecipeAction {
    /// Edit the selected recipe.
    Edit,
    /// Toggle the favorite flag.
    ToggleFavorite,
    /// Delete the selected recipe.
    Delete,
    /// Create a recipe.
    New,
}

impl RecipeAction {
    /// Build the bus event for this action
    pub fn into_event(self, source: CommandSource) -> AppEvent {
        match self {
            RecipeAction::Edit => AppEvent::EditRecipe { source },
            RecipeAction::ToggleFavorite => AppEvent::ToggleRecipeIsFavorite { source },
            RecipeAction::Delete => AppEvent::DeleteRecipe { source },
            RecipeAction::New => AppEvent::NewRecipe { source },
        }
    }

    /// The event kind this action publishes
    pub fn kind(self) -> EventKind {
        match self {
            RecipeAction::Edit => EventKind::EditRecipe,
            RecipeAction::ToggleFavorite => EventKind::ToggleRecipeIsFavorite,
            RecipeAction::Delete => EventKind::DeleteRecipe,
            RecipeAction::New => EventKind::NewRecipe,
        }
    }
}

/// Metadata keys a share sheet may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataKey {
    /// Title of the shared item.
    Title,
    /// Body text for message-style destinations.
    MessageBody,
    /// Link preview metadata.
    LinkPresentation,
    /// Preview thumbnail.
    Thumbnail,
}

/// Share payload describing the selected recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItemsConfiguration {
    /// Recipe title.
    pub title: String,
    /// Name of the full-size image asset being shared.
    pub image_name: String,
}

impl ActivityItemsConfiguration {
    /// Build the share configuration for a recipe
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            image_name: recipe.image_name.clone(),
        }
    }

    /// Answer a metadata request; only title and message body are provided
    pub fn metadata(&self, key: MetadataKey) -> Option<&str> {
        match key {
            MetadataKey::Title | MetadataKey::MessageBody => Some(&self.title),
            _ => None,
        }
    }
}
