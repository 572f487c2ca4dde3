//! Recipe detail presenter.
//!
//! The presenter owns the single selected recipe of a detail pane, keeps it
//! reconciled with the data store by identity, reacts to command events from
//! the bus, and produces a [`DetailRender`] value describing what the pane
//! should show.

mod detail;
mod flows;
mod render;

pub use detail::RecipeDetailPresenter;
pub use flows::{DeleteConfirmation, RecipeEditor, ShareItems};
pub use render::{
    DetailRender, RecipeRender, FAVORITE_SYMBOL, NOT_FAVORITE_SYMBOL, NO_RECIPE_MESSAGE,
};
