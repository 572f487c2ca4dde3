//! Modal flows opened by the presenter: editing, delete confirmation, sharing.

use recipekit_core::{ActivityItemsConfiguration, CommandSource, Recipe};
use serde::Serialize;

/// An open editing session for the selected recipe
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeEditor {
    /// Copy of the record when the session was opened
    pub recipe: Recipe,
    /// Surface whose command opened the editor
    pub opened_by: CommandSource,
    /// Increasing session number, unique per presenter
    pub session: u64,
}

/// A pending "really delete?" question
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    pub recipe: Recipe,
    pub requested_by: CommandSource,
}

impl DeleteConfirmation {
    pub fn new(recipe: Recipe, requested_by: CommandSource) -> Self {
        Self {
            recipe,
            requested_by,
        }
    }

    /// Question shown to the user
    pub fn prompt(&self) -> String {
        format!("Are you sure you want to delete {}?", self.recipe.title)
    }
}

/// Items handed to a share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareItems {
    pub title: String,
    pub image_name: String,
}

impl ShareItems {
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            image_name: recipe.image_name.clone(),
        }
    }
}

impl From<ShareItems> for ActivityItemsConfiguration {
    fn from(items: ShareItems) -> Self {
        ActivityItemsConfiguration {
            title: items.title,
            image_name: items.image_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_prompt() {
        let confirmation =
            DeleteConfirmation::new(Recipe::new("Banana Bread"), CommandSource::MenuBar);
        assert_eq!(
            confirmation.prompt(),
            "Are you sure you want to delete Banana Bread?"
        );
    }

    #[test]
    fn test_share_items_match_activity_configuration() {
        let recipe = Recipe::new("Gazpacho").with_image("gazpacho");
        let configuration: ActivityItemsConfiguration = ShareItems::for_recipe(&recipe).into();
        assert_eq!(configuration, ActivityItemsConfiguration::for_recipe(&recipe));
    }
}
