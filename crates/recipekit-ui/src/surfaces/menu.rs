//! Menu bar model.
//!
//! Menus are plain data. [`MenuBuilder`] starts from the standard menus of a
//! menu system and [`MenuBar::build_menu`] adds the recipe commands to it.
//! Choosing a command, directly or through its key equivalent, publishes the
//! command's action on the bus.

use recipekit_core::{CommandSource, EventBus, RecipeAction};
use serde::Serialize;
use std::sync::Arc;

use super::CommandSurface;

/// Which menu hierarchy is being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuSystem {
    /// The application menu bar
    Main,
    /// A context menu
    Context,
}

/// Standard top-level menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuIdentifier {
    File,
    Edit,
    View,
    Window,
    Help,
}

impl MenuIdentifier {
    pub fn title(self) -> &'static str {
        match self {
            MenuIdentifier::File => "File",
            MenuIdentifier::Edit => "Edit",
            MenuIdentifier::View => "View",
            MenuIdentifier::Window => "Window",
            MenuIdentifier::Help => "Help",
        }
    }
}

/// Key modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    Command,
    Shift,
    Alt,
    Control,
}

/// Keyboard shortcut of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEquivalent {
    pub input: String,
    pub modifiers: Vec<Modifier>,
}

impl KeyEquivalent {
    pub fn command(input: &str) -> Self {
        Self {
            input: input.to_string(),
            modifiers: vec![Modifier::Command],
        }
    }

    fn matches(&self, input: &str, modifiers: &[Modifier]) -> bool {
        self.input.eq_ignore_ascii_case(input)
            && self.modifiers.len() == modifiers.len()
            && self.modifiers.iter().all(|m| modifiers.contains(m))
    }
}

impl std::fmt::Display for KeyEquivalent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for modifier in &self.modifiers {
            let symbol = match modifier {
                Modifier::Command => "⌘",
                Modifier::Shift => "⇧",
                Modifier::Alt => "⌥",
                Modifier::Control => "⌃",
            };
            f.write_str(symbol)?;
        }
        f.write_str(&self.input.to_uppercase())
    }
}

/// A menu entry that performs an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuCommand {
    pub title: String,
    pub action: RecipeAction,
    pub key_equivalent: Option<KeyEquivalent>,
}

/// One child of a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MenuItem {
    Command(MenuCommand),
    /// Commands displayed inline, separated from their siblings
    InlineGroup { children: Vec<MenuCommand> },
}

impl MenuItem {
    fn commands(&self) -> Box<dyn Iterator<Item = &MenuCommand> + '_> {
        match self {
            MenuItem::Command(command) => Box::new(std::iter::once(command)),
            MenuItem::InlineGroup { children } => Box::new(children.iter()),
        }
    }
}

/// A top-level menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub identifier: MenuIdentifier,
    pub title: String,
    pub children: Vec<MenuItem>,
}

impl Menu {
    pub fn new(identifier: MenuIdentifier) -> Self {
        Self {
            identifier,
            title: identifier.title().to_string(),
            children: Vec::new(),
        }
    }

    /// Every command in this menu, inline groups flattened
    pub fn commands(&self) -> impl Iterator<Item = &MenuCommand> {
        self.children.iter().flat_map(MenuItem::commands)
    }
}

/// Menu hierarchy under construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuBuilder {
    system: MenuSystem,
    menus: Vec<Menu>,
}

impl MenuBuilder {
    /// Start from the standard menus of `system`
    pub fn new(system: MenuSystem) -> Self {
        let menus = match system {
            MenuSystem::Main => [
                MenuIdentifier::File,
                MenuIdentifier::Edit,
                MenuIdentifier::View,
                MenuIdentifier::Window,
                MenuIdentifier::Help,
            ]
            .into_iter()
            .map(Menu::new)
            .collect(),
            MenuSystem::Context => Vec::new(),
        };
        Self { system, menus }
    }

    pub fn system(&self) -> MenuSystem {
        self.system
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn menu(&self, identifier: MenuIdentifier) -> Option<&Menu> {
        self.menus.iter().find(|m| m.identifier == identifier)
    }

    /// Insert `item` first in the menu; false if the menu does not exist
    pub fn insert_child_at_start(&mut self, identifier: MenuIdentifier, item: MenuItem) -> bool {
        match self.menus.iter_mut().find(|m| m.identifier == identifier) {
            Some(menu) => {
                menu.children.insert(0, item);
                true
            }
            None => false,
        }
    }

    /// Append `item` to the menu; false if the menu does not exist
    pub fn insert_child_at_end(&mut self, identifier: MenuIdentifier, item: MenuItem) -> bool {
        match self.menus.iter_mut().find(|m| m.identifier == identifier) {
            Some(menu) => {
                menu.children.push(item);
                true
            }
            None => false,
        }
    }

    /// Command bound to a key equivalent
    pub fn command_for_key(&self, input: &str, modifiers: &[Modifier]) -> Option<&MenuCommand> {
        self.menus
            .iter()
            .flat_map(Menu::commands)
            .find(|command| {
                command
                    .key_equivalent
                    .as_ref()
                    .is_some_and(|key| key.matches(input, modifiers))
            })
    }
}

/// The application menu bar
#[derive(Debug, Clone)]
pub struct MenuBar {
    bus: Arc<EventBus>,
}

impl MenuBar {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Add the recipe commands. Only the main menu system is touched.
    pub fn build_menu(&self, builder: &mut MenuBuilder) {
        if builder.system() != MenuSystem::Main {
            return;
        }

        let new_recipe = MenuCommand {
            title: "New Recipe".to_string(),
            action: RecipeAction::New,
            key_equivalent: Some(KeyEquivalent::command("n")),
        };
        builder.insert_child_at_start(
            MenuIdentifier::File,
            MenuItem::InlineGroup {
                children: vec![new_recipe],
            },
        );

        builder.insert_child_at_end(
            MenuIdentifier::Edit,
            MenuItem::Command(MenuCommand {
                title: "Delete".to_string(),
                action: RecipeAction::Delete,
                key_equivalent: None,
            }),
        );
    }

    /// Choose a menu command
    pub fn activate(&self, action: RecipeAction) -> usize {
        self.send(action)
    }

    /// Handle a key press against the built menus; `None` when unbound
    pub fn handle_key(
        &self,
        menus: &MenuBuilder,
        input: &str,
        modifiers: &[Modifier],
    ) -> Option<usize> {
        let command = menus.command_for_key(input, modifiers)?;
        tracing::debug!("Key {} chose {}", input, command.title);
        Some(self.activate(command.action))
    }
}

impl CommandSurface for MenuBar {
    fn source(&self) -> CommandSource {
        CommandSource::MenuBar
    }

    fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipekit_core::{AppEvent, EventKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_main_menu_gets_new_recipe_first_in_file() {
        let mut builder = MenuBuilder::new(MenuSystem::Main);
        builder.insert_child_at_end(
            MenuIdentifier::File,
            MenuItem::Command(MenuCommand {
                title: "Close".to_string(),
                action: RecipeAction::Delete,
                key_equivalent: None,
            }),
        );
        MenuBar::new(Arc::new(EventBus::new())).build_menu(&mut builder);

        let file = builder.menu(MenuIdentifier::File).expect("file menu");
        assert_eq!(file.children.len(), 2);
        match &file.children[0] {
            MenuItem::InlineGroup { children } => {
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].title, "New Recipe");
                assert_eq!(children[0].action, RecipeAction::New);
                assert_eq!(
                    children[0].key_equivalent.as_ref().map(|k| k.to_string()),
                    Some("⌘N".to_string())
                );
            }
            other => panic!("unexpected first item {:?}", other),
        }

        let edit = builder.menu(MenuIdentifier::Edit).expect("edit menu");
        assert!(edit.commands().any(|c| c.action == RecipeAction::Delete));
    }

    #[test]
    fn test_other_menu_systems_are_untouched() {
        let mut builder = MenuBuilder::new(MenuSystem::Context);
        let before = builder.clone();
        MenuBar::new(Arc::new(EventBus::new())).build_menu(&mut builder);
        assert_eq!(builder, before);
    }

    #[test]
    fn test_key_equivalent_publishes_new_recipe() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _sub = bus.on(EventKind::NewRecipe, move |event: &AppEvent| {
            assert_eq!(event.source(), Some(CommandSource::MenuBar));
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let menu_bar = MenuBar::new(Arc::clone(&bus));
        let mut builder = MenuBuilder::new(MenuSystem::Main);
        menu_bar.build_menu(&mut builder);

        assert_eq!(menu_bar.handle_key(&builder, "N", &[Modifier::Command]), Some(1));
        assert_eq!(menu_bar.handle_key(&builder, "n", &[]), None);
        assert_eq!(
            menu_bar.handle_key(&builder, "n", &[Modifier::Command, Modifier::Shift]),
            None
        );
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_two_menu_bars_share_a_bus() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _sub = bus.on(EventKind::DeleteRecipe, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let first = MenuBar::new(Arc::clone(&bus));
        let second = MenuBar::new(Arc::clone(&bus));
        first.activate(RecipeAction::Delete);
        second.activate(RecipeAction::Delete);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
