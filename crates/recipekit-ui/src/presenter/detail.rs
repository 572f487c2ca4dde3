//! The detail presenter and its subscriptions.

use parking_lot::Mutex;
use recipekit_core::{
    ActivityItemsConfiguration, AppEvent, CommandSource, DataStore, EventBus, EventKind, Recipe,
    RecipeId, RecipeSnapshot, StoreError, SubscriptionSet,
};
use recipekit_settings::{observe_initial, BackgroundTint, PreferenceStore, NAME_COLOR_KEY};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::flows::{DeleteConfirmation, RecipeEditor, ShareItems};
use super::render::DetailRender;

/// Share configuration waiting to be published once the state lock is gone.
type PendingShare = Option<Option<ActivityItemsConfiguration>>;

#[derive(Debug, Default)]
struct PresenterState {
    recipe: Option<Recipe>,
    tint: BackgroundTint,
    rendered: DetailRender,
    editor: Option<RecipeEditor>,
    confirmation: Option<DeleteConfirmation>,
    sessions: u64,
    closed: bool,
}

struct Shared {
    bus: Arc<EventBus>,
    store: Arc<dyn DataStore>,
    state: Mutex<PresenterState>,
    render_count: AtomicU64,
    subscriptions: SubscriptionSet,
}

/// Presenter for the recipe detail pane.
///
/// Every subscription handler holds only a weak reference to the presenter,
/// and all of them are released by [`close`](Self::close) or on drop. The
/// state lock is never held while the store or the bus is called, so
/// handlers triggered by the presenter's own writes can re-enter it.
pub struct RecipeDetailPresenter {
    shared: Arc<Shared>,
}

impl RecipeDetailPresenter {
    /// Create a presenter and subscribe it to the store, the bus and the
    /// title tint preference.
    pub fn attach(
        bus: Arc<EventBus>,
        store: Arc<dyn DataStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let shared = Arc::new(Shared {
            bus: Arc::clone(&bus),
            store: Arc::clone(&store),
            state: Mutex::new(PresenterState::default()),
            render_count: AtomicU64::new(0),
            subscriptions: SubscriptionSet::new(),
        });
        let weak = Arc::downgrade(&shared);

        let w = Weak::clone(&weak);
        shared.subscriptions.push(observe_initial(
            preferences.as_ref(),
            NAME_COLOR_KEY,
            move |value| {
                if let Some(shared) = w.upgrade() {
                    shared.apply_tint(BackgroundTint::from_value(value));
                }
                Ok(())
            },
        ));

        let w = Weak::clone(&weak);
        shared
            .subscriptions
            .push(store.subscribe(Box::new(move |snapshot: &RecipeSnapshot| {
                if let Some(shared) = w.upgrade() {
                    shared.on_store_updated(snapshot.records());
                }
                Ok(())
            })));

        let w = Weak::clone(&weak);
        shared
            .subscriptions
            .push(bus.on(EventKind::EditRecipe, move |event| {
                if let Some(shared) = w.upgrade() {
                    shared.begin_edit(event.source().unwrap_or(CommandSource::App));
                }
                Ok(())
            }));

        let w = Weak::clone(&weak);
        shared
            .subscriptions
            .push(bus.on(EventKind::ToggleRecipeIsFavorite, move |_| {
                if let Some(shared) = w.upgrade() {
                    shared.toggle_favorite();
                }
                Ok(())
            }));

        let w = weak;
        shared
            .subscriptions
            .push(bus.on(EventKind::DeleteRecipe, move |event| {
                if let Some(shared) = w.upgrade() {
                    shared.request_delete(event.source().unwrap_or(CommandSource::App));
                }
                Ok(())
            }));

        tracing::debug!(
            "Detail presenter attached with {} subscriptions",
            shared.subscriptions.len()
        );
        Self { shared }
    }

    /// Select a recipe by identity; unknown ids and `None` show the
    /// placeholder.
    pub fn set_selection(&self, id: Option<RecipeId>) {
        let recipe = id.and_then(|id| self.shared.store.get(id));
        if let (Some(id), None) = (id, &recipe) {
            tracing::debug!("Selection {} is not in the store", id);
        }
        self.shared.assign(recipe);
    }

    /// Re-resolve the selection against a fresh copy of the records
    pub fn on_store_updated(&self, records: &[Recipe]) {
        self.shared.on_store_updated(records);
    }

    /// Flip the favorite flag of the selection.
    ///
    /// Returns the stored record, or `None` when nothing is selected or the
    /// record disappeared (which also clears the selection).
    pub fn toggle_favorite(&self) -> Option<Recipe> {
        self.shared.toggle_favorite()
    }

    /// Open the editor for the selection, as an `EditRecipe` event would
    pub fn begin_edit(&self, source: CommandSource) -> Option<RecipeEditor> {
        self.shared.begin_edit(source)
    }

    /// The open editing session, if any
    pub fn editor(&self) -> Option<RecipeEditor> {
        self.shared.state.lock().editor.clone()
    }

    /// Write the edited recipe and close the editor.
    ///
    /// The identity of the session's record is kept whatever `edited`
    /// carries. Returns the stored record; `None` when no editor was open or
    /// the record disappeared meanwhile.
    pub fn save_edit(&self, edited: Recipe) -> Option<Recipe> {
        self.shared.save_edit(edited)
    }

    /// Close the editor without writing; false if none was open
    pub fn cancel_edit(&self) -> bool {
        self.shared.state.lock().editor.take().is_some()
    }

    /// Ask for delete confirmation, as a `DeleteRecipe` event would
    pub fn request_delete(&self, source: CommandSource) -> Option<DeleteConfirmation> {
        self.shared.request_delete(source)
    }

    /// The pending delete confirmation, if any
    pub fn pending_delete(&self) -> Option<DeleteConfirmation> {
        self.shared.state.lock().confirmation.clone()
    }

    /// Delete the recipe awaiting confirmation
    pub fn confirm_delete(&self) -> bool {
        self.shared.confirm_delete()
    }

    /// Dismiss the confirmation; false if none was pending
    pub fn cancel_delete(&self) -> bool {
        self.shared.state.lock().confirmation.take().is_some()
    }

    /// Items for the share sheet
    pub fn share_items(&self) -> Option<ShareItems> {
        self.shared
            .state
            .lock()
            .recipe
            .as_ref()
            .map(ShareItems::for_recipe)
    }

    /// The pane became visible; re-announce the share configuration
    pub fn did_appear(&self) {
        let configuration = {
            let state = self.shared.state.lock();
            if state.closed {
                return;
            }
            state.recipe.as_ref().map(ActivityItemsConfiguration::for_recipe)
        };
        self.shared.publish_share(Some(configuration));
    }

    /// The currently selected record
    pub fn selection(&self) -> Option<Recipe> {
        self.shared.state.lock().recipe.clone()
    }

    /// Current title tint
    pub fn tint(&self) -> BackgroundTint {
        self.shared.state.lock().tint
    }

    /// Last render
    pub fn rendered(&self) -> DetailRender {
        self.shared.state.lock().rendered.clone()
    }

    /// Number of renders since attach
    pub fn render_count(&self) -> u64 {
        self.shared.render_count.load(Ordering::SeqCst)
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Release every subscription and dismiss open flows. Idempotent.
    pub fn close(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.editor = None;
            state.confirmation = None;
        }
        self.shared.subscriptions.release_all();
        tracing::debug!("Detail presenter closed");
    }
}

impl Drop for RecipeDetailPresenter {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RecipeDetailPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("RecipeDetailPresenter")
            .field("selection", &state.recipe.as_ref().map(|r| r.id))
            .field("tint", &state.tint)
            .field("closed", &state.closed)
            .finish()
    }
}

impl Shared {
    fn selected_id(&self) -> Option<RecipeId> {
        self.state.lock().recipe.as_ref().map(|r| r.id)
    }

    fn render(&self, state: &mut PresenterState) {
        state.rendered = DetailRender::for_selection(state.recipe.as_ref(), state.tint);
        let count = self.render_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!("Render #{}: {:?}", count, state.rendered.title());
    }

    /// Store a new selection and render. Returns the share configuration to
    /// publish when the selection changed.
    fn replace(&self, state: &mut PresenterState, recipe: Option<Recipe>) -> PendingShare {
        if state.closed {
            return None;
        }
        let changed = state.recipe != recipe;
        state.recipe = recipe;
        self.render(state);
        changed.then(|| state.recipe.as_ref().map(ActivityItemsConfiguration::for_recipe))
    }

    fn assign(&self, recipe: Option<Recipe>) {
        let pending = {
            let mut state = self.state.lock();
            self.replace(&mut state, recipe)
        };
        self.publish_share(pending);
    }

    fn publish_share(&self, pending: PendingShare) {
        if let Some(configuration) = pending {
            self.bus
                .publish(AppEvent::ActivityItemsConfigurationDidChange { configuration });
        }
    }

    fn apply_tint(&self, tint: BackgroundTint) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.tint = tint;
        self.render(&mut state);
        tracing::debug!("Title tint is now {}", tint);
    }

    fn on_store_updated(&self, records: &[Recipe]) {
        let pending = {
            let mut state = self.state.lock();
            let Some(id) = state.recipe.as_ref().map(|r| r.id) else {
                return;
            };
            let updated = records.iter().find(|r| r.id == id).cloned();
            if updated.is_none() {
                tracing::debug!("Selected recipe {} left the store", id);
            }
            self.replace(&mut state, updated)
        };
        self.publish_share(pending);
    }

    fn toggle_favorite(&self) -> Option<Recipe> {
        let id = self.selected_id()?;

        // Re-read so a write made elsewhere since the last update is not lost.
        let Some(mut recipe) = self.store.get(id) else {
            self.clear_if_selected(id);
            return None;
        };
        recipe.is_favorite = !recipe.is_favorite;

        match self.store.update(recipe) {
            Ok(stored) => {
                tracing::info!(
                    "Recipe {} favorite: {}",
                    stored.id,
                    stored.is_favorite
                );
                self.refresh_if_selected(&stored);
                Some(stored)
            }
            Err(StoreError::MissingTarget { id }) => {
                self.clear_if_selected(id);
                None
            }
        }
    }

    /// Show the written record, unless the selection moved on meanwhile
    fn refresh_if_selected(&self, stored: &Recipe) {
        let pending = {
            let mut state = self.state.lock();
            if state.recipe.as_ref().map(|r| r.id) != Some(stored.id) {
                return;
            }
            self.replace(&mut state, Some(stored.clone()))
        };
        self.publish_share(pending);
    }

    fn clear_if_selected(&self, id: RecipeId) {
        let pending = {
            let mut state = self.state.lock();
            if state.recipe.as_ref().map(|r| r.id) != Some(id) {
                return;
            }
            self.replace(&mut state, None)
        };
        self.publish_share(pending);
    }

    fn begin_edit(&self, source: CommandSource) -> Option<RecipeEditor> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        let Some(recipe) = state.recipe.clone() else {
            tracing::debug!("Edit from {} ignored, nothing selected", source);
            return None;
        };
        state.sessions += 1;
        let editor = RecipeEditor {
            recipe,
            opened_by: source,
            session: state.sessions,
        };
        if let Some(previous) = state.editor.replace(editor.clone()) {
            tracing::debug!("Editor session {} replaced", previous.session);
        }
        tracing::info!(
            "Editing {} (session {}, from {})",
            editor.recipe.title,
            editor.session,
            source
        );
        Some(editor)
    }

    fn save_edit(&self, mut edited: Recipe) -> Option<Recipe> {
        let Some(editor) = self.state.lock().editor.take() else {
            tracing::warn!("Save without an open editor ignored");
            return None;
        };
        edited.id = editor.recipe.id;

        match self.store.update(edited) {
            Ok(stored) => {
                self.refresh_if_selected(&stored);
                Some(stored)
            }
            Err(StoreError::MissingTarget { id }) => {
                tracing::debug!("Edited recipe {} no longer exists", id);
                self.clear_if_selected(id);
                None
            }
        }
    }

    fn request_delete(&self, source: CommandSource) -> Option<DeleteConfirmation> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        let recipe = state.recipe.clone()?;
        let confirmation = DeleteConfirmation::new(recipe, source);
        tracing::debug!("{}", confirmation.prompt());
        state.confirmation = Some(confirmation.clone());
        Some(confirmation)
    }

    fn confirm_delete(&self) -> bool {
        let Some(confirmation) = self.state.lock().confirmation.take() else {
            return false;
        };

        let deleted = self.store.delete(&confirmation.recipe);
        if deleted {
            tracing::info!("Deleted {}", confirmation.recipe.title);
            self.clear_if_selected(confirmation.recipe.id);
        }
        deleted
    }
}
