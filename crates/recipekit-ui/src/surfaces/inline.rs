//! Buttons inside the detail pane.

use recipekit_core::{CommandSource, EventBus, RecipeAction};
use std::sync::Arc;

use super::CommandSurface;

/// Favorite, edit and delete buttons of the detail pane
#[derive(Debug, Clone)]
pub struct InlineButtons {
    bus: Arc<EventBus>,
}

impl InlineButtons {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    pub fn favorite(&self) -> usize {
        self.send(RecipeAction::ToggleFavorite)
    }

    pub fn edit(&self) -> usize {
        self.send(RecipeAction::Edit)
    }

    pub fn delete(&self) -> usize {
        self.send(RecipeAction::Delete)
    }
}

impl CommandSurface for InlineButtons {
    fn source(&self) -> CommandSource {
        CommandSource::InlineButton
    }

    fn bus(&self) -> &EventBus {
        &self.bus
    }
}
