use anyhow::Context;
use recipekit::{
    init_logging, CommandSurface, Config, DetailRender, InMemoryDataStore, Modifier, Platform,
    PreferenceStore, PreferenceValue, RecipeAction, RecipeId, RecipesApp, ToolbarItemIdentifier,
    NAME_COLOR_KEY,
};
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

struct Args {
    config: Option<PathBuf>,
    recipes: Option<PathBuf>,
    platform: Platform,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        recipes: None,
        platform: Platform::MacCatalyst,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--recipes" => {
                let path = iter.next().context("--recipes needs a path")?;
                args.recipes = Some(PathBuf::from(path));
            }
            "--platform" => {
                let name = iter.next().context("--platform needs a name")?;
                args.platform = name.parse()?;
            }
            other => anyhow::bail!("Unknown argument '{}'", other),
        }
    }
    Ok(args)
}

fn print_render(step: &str, render: &DetailRender) -> anyhow::Result<()> {
    println!("{}: {}", step, serde_json::to_string(render)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_or_default(&Config::default_path()?)?,
    };

    init_logging(&config.logging)?;

    let store = match &args.recipes {
        Some(path) => InMemoryDataStore::load_json(path)
            .with_context(|| format!("Failed to load recipes from {}", path.display()))?,
        None => InMemoryDataStore::sample(),
    };
    let app = RecipesApp::launch_with_store(config, args.platform, store)?;

    // Mirror every bus event into the log from an async task.
    let mut receiver = app.bus().receiver();
    let logger = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => tracing::info!("event: {}", event.description()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event log skipped {} event(s)", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    app.select(Some(RecipeId(1)));
    print_render("select", &app.presenter().rendered())?;

    app.buttons().favorite();
    print_render("inline favorite", &app.presenter().rendered())?;

    if let Some(toolbar) = app.toolbar() {
        toolbar.activate(ToolbarItemIdentifier::ToggleRecipeIsFavorite);
        print_render("toolbar favorite", &app.presenter().rendered())?;
    }

    app.preferences().set(NAME_COLOR_KEY, PreferenceValue::Integer(2));
    print_render("tint", &app.presenter().rendered())?;

    app.menu_bar().handle_key(app.menus(), "n", &[Modifier::Command]);
    print_render("new recipe", &app.presenter().rendered())?;

    app.menu_bar().send(RecipeAction::Edit);
    if let Some(editor) = app.presenter().editor() {
        let mut edited = editor.recipe.clone();
        edited.title = "Weeknight Pasta".to_string();
        app.presenter().save_edit(edited);
    }
    print_render("edit", &app.presenter().rendered())?;

    app.menu_bar().send(RecipeAction::Delete);
    if let Some(confirmation) = app.presenter().pending_delete() {
        println!("{}", confirmation.prompt());
        app.presenter().confirm_delete();
    }
    print_render("delete", &app.presenter().rendered())?;

    app.shutdown()?;
    logger.await?;

    Ok(())
}
