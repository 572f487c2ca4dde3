//! # RecipeKit UI
//!
//! Headless presentation layer: the recipe detail presenter with its render
//! model, and the command surfaces (menu bar, toolbar, inline buttons) that
//! publish user commands onto the event bus.

pub mod presenter;
pub mod surfaces;

pub use presenter::{
    DeleteConfirmation, DetailRender, RecipeDetailPresenter, RecipeEditor, RecipeRender,
    ShareItems, FAVORITE_SYMBOL, NOT_FAVORITE_SYMBOL, NO_RECIPE_MESSAGE,
};
pub use surfaces::{
    CommandSurface, InlineButtons, KeyEquivalent, Menu, MenuBar, MenuBuilder, MenuCommand,
    MenuIdentifier, MenuItem, MenuSystem, Modifier, Toolbar, ToolbarItem, ToolbarItemIdentifier,
};
