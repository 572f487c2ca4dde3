//! Recipe model and the data store seam.
//!
//! A [`Recipe`] is a passive record; identity is its [`RecipeId`] and
//! nothing else. The authoritative collection lives behind the
//! [`DataStore`] trait.

mod sample;
mod store;

pub use store::{DataStore, InMemoryDataStore, RecipeSnapshot, RecordsObserver};

use serde::{Deserialize, Serialize};

/// Stable recipe identity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecipeId(pub u64);

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A recipe record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Identity; assigned by the store on `add`.
    #[serde(default)]
    pub id: RecipeId,
    /// Display title.
    pub title: String,
    /// Name of the full-size image asset.
    #[serde(default)]
    pub image_name: String,
    /// Whether the user marked this recipe as a favorite.
    #[serde(default)]
    pub is_favorite: bool,
    /// Ingredient lines.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Direction steps.
    #[serde(default)]
    pub directions: Vec<String>,
}

impl Recipe {
    /// Create an unsaved recipe with the given title.
    ///
    /// The id is `RecipeId(0)` until a store assigns one.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: RecipeId(0),
            title: title.into(),
            image_name: String::new(),
            is_favorite: false,
            ingredients: Vec::new(),
            directions: Vec::new(),
        }
    }

    /// Set the identity
    pub fn with_id(mut self, id: RecipeId) -> Self {
        self.id = id;
        self
    }

    /// Set the image asset name
    pub fn with_image(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = image_name.into();
        self
    }

    /// Set the favorite flag
    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Set the ingredient lines
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Set the direction steps
    pub fn with_directions<I, S>(mut self, directions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directions = directions.into_iter().map(Into::into).collect();
        self
    }

    /// Same identity as `other`
    pub fn same_identity(&self, other: &Recipe) -> bool {
        self.id == other.id
    }
}
