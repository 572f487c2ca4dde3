//! Command surfaces.
//!
//! A surface turns a user gesture into a [`RecipeAction`] published on the
//! event bus. Surfaces never reference the presenter; any number of them,
//! of any kind, may share one bus.

mod inline;
mod menu;
mod toolbar;

pub use inline::InlineButtons;
pub use menu::{
    KeyEquivalent, Menu, MenuBar, MenuBuilder, MenuCommand, MenuIdentifier, MenuItem, MenuSystem,
    Modifier,
};
pub use toolbar::{Toolbar, ToolbarItem, ToolbarItemIdentifier};

use recipekit_core::{CommandSource, EventBus, RecipeAction};

/// Anything that issues recipe commands onto the bus
pub trait CommandSurface {
    /// Source stamped on every event this surface publishes
    fn source(&self) -> CommandSource;

    /// Bus the surface publishes to
    fn bus(&self) -> &EventBus;

    /// Publish `action`; returns how many subscribers it reached
    fn send(&self, action: RecipeAction) -> usize {
        let event = action.into_event(self.source());
        let delivered = self.bus().publish(event);
        tracing::debug!(
            "{} sent {:?} to {} subscriber(s)",
            self.source(),
            action,
            delivered
        );
        delivered
    }
}
