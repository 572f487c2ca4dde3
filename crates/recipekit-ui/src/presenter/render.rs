//! Render model produced by the presenter.

use recipekit_core::Recipe;
use recipekit_settings::BackgroundTint;
use serde::Serialize;

/// Placeholder shown when nothing is selected
pub const NO_RECIPE_MESSAGE: &str = "No Recipe Selected";

/// Favorite button symbol for a favorite recipe
pub const FAVORITE_SYMBOL: &str = "heart.fill";

/// Favorite button symbol otherwise
pub const NOT_FAVORITE_SYMBOL: &str = "heart";

/// What the detail pane shows for a selected recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRender {
    pub title: String,
    pub image_name: String,
    pub favorite_symbol: &'static str,
    pub title_tint: BackgroundTint,
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
}

impl RecipeRender {
    pub fn new(recipe: &Recipe, tint: BackgroundTint) -> Self {
        Self {
            title: recipe.title.clone(),
            image_name: recipe.image_name.clone(),
            favorite_symbol: if recipe.is_favorite {
                FAVORITE_SYMBOL
            } else {
                NOT_FAVORITE_SYMBOL
            },
            title_tint: tint,
            ingredients: recipe.ingredients.clone(),
            directions: recipe.directions.clone(),
        }
    }
}

/// Complete state of the detail pane
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DetailRender {
    Recipe(RecipeRender),
    Empty { message: String },
}

impl DetailRender {
    pub fn empty() -> Self {
        DetailRender::Empty {
            message: NO_RECIPE_MESSAGE.to_string(),
        }
    }

    pub fn for_selection(recipe: Option<&Recipe>, tint: BackgroundTint) -> Self {
        match recipe {
            Some(recipe) => DetailRender::Recipe(RecipeRender::new(recipe, tint)),
            None => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DetailRender::Empty { .. })
    }

    /// Title of the shown recipe, if any
    pub fn title(&self) -> Option<&str> {
        match self {
            DetailRender::Recipe(render) => Some(&render.title),
            DetailRender::Empty { .. } => None,
        }
    }
}

impl Default for DetailRender {
    fn default() -> Self {
        Self::empty()
    }
}
