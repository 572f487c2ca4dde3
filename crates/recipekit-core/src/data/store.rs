//! Data store trait and in-memory implementation.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Recipe, RecipeId};
use crate::error::{Error, StoreError};
use crate::event_bus::{Describe, HandlerResult, SubscriberRegistry, Subscription};

/// The full collection, delivered to observers after every change.
///
/// `version` increases with every write, in write order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSnapshot {
    records: Vec<Recipe>,
    version: u64,
}

impl RecipeSnapshot {
    /// Wrap a collection
    pub fn new(records: Vec<Recipe>) -> Self {
        Self {
            records,
            version: 0,
        }
    }

    /// Write counter of the store at the time the snapshot was taken
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All records, in store order
    pub fn records(&self) -> &[Recipe] {
        &self.records
    }

    /// Find a record by identity
    pub fn find(&self, id: RecipeId) -> Option<&Recipe> {
        self.records.iter().find(|r| r.id == id)
    }
}

impl Describe for RecipeSnapshot {
    fn describe(&self) -> String {
        format!("{} recipes (v{})", self.records.len(), self.version)
    }
}

/// Observer invoked with the full collection after each change
pub type RecordsObserver = Box<dyn Fn(&RecipeSnapshot) -> HandlerResult + Send + Sync>;

/// Authoritative holder of recipe records.
///
/// Observers are notified synchronously after every successful `add`,
/// `update` and `delete`, including writes made by the observer's owner.
/// An observer never receives a snapshot older than one it has already seen.
pub trait DataStore: Send + Sync {
    /// Every record, in display order
    fn all(&self) -> Vec<Recipe>;

    /// Look a record up by identity
    fn get(&self, id: RecipeId) -> Option<Recipe>;

    /// Insert a record, assigning it a fresh identity
    fn add(&self, recipe: Recipe) -> Recipe;

    /// Replace the record with the same identity.
    ///
    /// Returns the stored value, or `StoreError::MissingTarget` when the
    /// identity is not in the store.
    fn update(&self, recipe: Recipe) -> Result<Recipe, StoreError>;

    /// Remove the record with the same identity; false if it was not there
    fn delete(&self, recipe: &Recipe) -> bool;

    /// Observe the collection
    fn subscribe(&self, observer: RecordsObserver) -> Subscription;
}

/// Process-local store backed by a vector.
pub struct InMemoryDataStore {
    recipes: RwLock<Vec<Recipe>>,
    next_id: AtomicU64,
    revision: AtomicU64,
    observers: SubscriberRegistry<RecipeSnapshot>,
}

impl InMemoryDataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_recipes(Vec::new())
    }

    /// Create a store holding `recipes`.
    ///
    /// Records keep their ids; records with `RecipeId(0)` get a fresh one.
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        let mut next = recipes.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let recipes = recipes
            .into_iter()
            .map(|mut recipe| {
                if recipe.id.0 == 0 {
                    recipe.id = RecipeId(next);
                    next += 1;
                }
                recipe
            })
            .collect();

        Self {
            recipes: RwLock::new(recipes),
            next_id: AtomicU64::new(next),
            revision: AtomicU64::new(0),
            observers: SubscriberRegistry::new("data-store"),
        }
    }

    /// Create a store seeded with the sample recipes
    pub fn sample() -> Self {
        Self::with_recipes(super::sample::sample_recipes())
    }

    /// Load a store from a JSON array of recipes.
    ///
    /// Records without an id get a fresh one. Two records sharing an id are
    /// rejected.
    pub fn load_json(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let recipes: Vec<Recipe> = serde_json::from_str(&content)?;

        let mut ids = HashSet::new();
        if let Some(duplicate) = recipes
            .iter()
            .map(|r| r.id)
            .filter(|id| id.0 != 0)
            .find(|id| !ids.insert(*id))
        {
            return Err(Error::other(format!(
                "Recipe {} appears twice in {}",
                duplicate,
                path.display()
            )));
        }

        tracing::info!("Loaded {} recipe(s) from {}", recipes.len(), path.display());
        Ok(Self::with_recipes(recipes))
    }

    /// Write every record as a JSON array
    pub fn save_json(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(&self.all())?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved {} recipe(s) to {}", self.len(), path.display());
        Ok(())
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.recipes.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.recipes.read().is_empty()
    }

    /// Must be called with the write lock held so versions follow write order.
    fn snapshot_of(&self, recipes: &[Recipe]) -> RecipeSnapshot {
        RecipeSnapshot {
            records: recipes.to_vec(),
            version: self.revision.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for InMemoryDataStore {
    fn all(&self) -> Vec<Recipe> {
        self.recipes.read().clone()
    }

    fn get(&self, id: RecipeId) -> Option<Recipe> {
        self.recipes.read().iter().find(|r| r.id == id).cloned()
    }

    fn add(&self, mut recipe: Recipe) -> Recipe {
        recipe.id = RecipeId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let snapshot = {
            let mut recipes = self.recipes.write();
            recipes.push(recipe.clone());
            self.snapshot_of(&recipes)
        };
        tracing::debug!("Added recipe {} ({})", recipe.id, recipe.title);
        self.observers.publish(snapshot);
        recipe
    }

    fn update(&self, recipe: Recipe) -> Result<Recipe, StoreError> {
        let snapshot = {
            let mut recipes = self.recipes.write();
            let Some(slot) = recipes.iter_mut().find(|r| r.id == recipe.id) else {
                tracing::debug!("Update skipped, recipe {} is gone", recipe.id);
                return Err(StoreError::MissingTarget { id: recipe.id });
            };
            *slot = recipe.clone();
            self.snapshot_of(&recipes)
        };
        tracing::debug!("Updated recipe {}", recipe.id);
        self.observers.publish(snapshot);
        Ok(recipe)
    }

    fn delete(&self, recipe: &Recipe) -> bool {
        let snapshot = {
            let mut recipes = self.recipes.write();
            let before = recipes.len();
            recipes.retain(|r| r.id != recipe.id);
            (recipes.len() != before).then(|| self.snapshot_of(&recipes))
        };
        let Some(snapshot) = snapshot else {
            return false;
        };
        tracing::debug!("Deleted recipe {}", recipe.id);
        self.observers.publish(snapshot);
        true
    }

    fn subscribe(&self, observer: RecordsObserver) -> Subscription {
        // Concurrent writers may enqueue their snapshots out of order.
        let seen = AtomicU64::new(0);
        self.observers.subscribe(move |snapshot: &RecipeSnapshot| {
            if seen.fetch_max(snapshot.version, Ordering::AcqRel) >= snapshot.version {
                tracing::trace!("Skipping superseded snapshot v{}", snapshot.version);
                return Ok(());
            }
            observer(snapshot)
        })
    }
}

impl std::fmt::Debug for InMemoryDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDataStore")
            .field("recipes", &self.len())
            .field("observers", &self.observers.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_add_assigns_fresh_ids() {
        let store = InMemoryDataStore::new();
        let a = store.add(Recipe::new("A"));
        let b = store.add(Recipe::new("B"));
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b.id).map(|r| r.title), Some("B".to_string()));
    }

    #[test]
    fn test_with_recipes_keeps_ids() {
        let store = InMemoryDataStore::with_recipes(vec![
            Recipe::new("Kept").with_id(RecipeId(42)),
            Recipe::new("Fresh"),
        ]);
        let all = store.all();
        assert_eq!(all[0].id, RecipeId(42));
        assert_eq!(all[1].id, RecipeId(43));
        assert_eq!(store.add(Recipe::new("Next")).id, RecipeId(44));
    }

    #[test]
    fn test_update_missing_target() {
        let store = InMemoryDataStore::new();
        let ghost = Recipe::new("Ghost").with_id(RecipeId(99));
        assert_eq!(
            store.update(ghost),
            Err(StoreError::MissingTarget { id: RecipeId(99) })
        );
    }

    #[test]
    fn test_update_preserves_position() {
        let store = InMemoryDataStore::with_recipes(vec![
            Recipe::new("One").with_id(RecipeId(1)),
            Recipe::new("Two").with_id(RecipeId(2)),
        ]);
        let updated = store
            .update(Recipe::new("Uno").with_id(RecipeId(1)))
            .expect("record exists");
        assert_eq!(updated.title, "Uno");
        assert_eq!(store.all()[0].title, "Uno");
    }

    #[test]
    fn test_delete() {
        let store = InMemoryDataStore::new();
        let recipe = store.add(Recipe::new("Gone soon"));
        assert!(store.delete(&recipe));
        assert!(!store.delete(&recipe));
        assert!(store.is_empty());
    }

    #[test]
    fn test_observers_receive_collection_after_each_change() {
        let store = InMemoryDataStore::new();
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let _sub = store.subscribe(Box::new(move |snapshot: &RecipeSnapshot| {
            seen_clone.lock().push(snapshot.records().len());
            Ok(())
        }));

        let recipe = store.add(Recipe::new("A"));
        store.add(Recipe::new("B"));
        store
            .update(Recipe { is_favorite: true, ..recipe.clone() })
            .expect("exists");
        store.delete(&recipe);
        // A failed write does not notify
        let _ = store.update(recipe);

        assert_eq!(seen.lock().as_slice(), &[1, 2, 2, 1]);
    }

    #[test]
    fn test_concurrent_writers_never_leave_observers_behind() {
        let store = Arc::new(InMemoryDataStore::new());
        let delivered: Arc<Mutex<Vec<(u64, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let d = Arc::clone(&delivered);
        let _sub = store.subscribe(Box::new(move |snapshot: &RecipeSnapshot| {
            d.lock().push((snapshot.version(), snapshot.records().len()));
            Ok(())
        }));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        store.add(Recipe::new(format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer thread panicked");
        }

        let delivered = delivered.lock();
        assert!(delivered.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert!(delivered.iter().all(|&(version, len)| version as usize == len));
        assert_eq!(delivered.last().copied(), Some((1000, store.len())));
    }

    #[test]
    fn test_observer_may_read_store() {
        let store = Arc::new(InMemoryDataStore::new());
        let reader = Arc::clone(&store);
        let counts = Arc::new(Mutex::new(Vec::new()));
        let counts_clone = Arc::clone(&counts);
        let _sub = store.subscribe(Box::new(move |_: &RecipeSnapshot| {
            counts_clone.lock().push(reader.len());
            Ok(())
        }));
        store.add(Recipe::new("A"));
        assert_eq!(counts.lock().as_slice(), &[1]);
    }

    #[test]
    fn test_json_file_keeps_ids_and_fills_missing_ones() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.json");
        std::fs::write(
            &path,
            r#"[{"id": 7, "title": "Soup", "is_favorite": true}, {"title": "Bread"}]"#,
        )?;

        let store = InMemoryDataStore::load_json(&path)?;
        assert_eq!(store.get(RecipeId(7)).map(|r| r.is_favorite), Some(true));
        assert_eq!(store.get(RecipeId(8)).map(|r| r.title), Some("Bread".to_string()));

        let copy = dir.path().join("copy.json");
        store.save_json(&copy)?;
        assert_eq!(InMemoryDataStore::load_json(&copy)?.all(), store.all());
        Ok(())
    }

    #[test]
    fn test_json_load_errors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let missing = InMemoryDataStore::load_json(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(Error::Io(_))));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "{ not json")?;
        assert!(matches!(
            InMemoryDataStore::load_json(&garbled),
            Err(Error::Serialization(_))
        ));

        let twice = dir.path().join("twice.json");
        std::fs::write(&twice, r#"[{"id": 3, "title": "A"}, {"id": 3, "title": "B"}]"#)?;
        match InMemoryDataStore::load_json(&twice) {
            Err(Error::Other(message)) => assert!(message.starts_with("Recipe #3 appears twice")),
            other => panic!("unexpected {:?}", other.map(|s| s.len())),
        }
        Ok(())
    }

    #[test]
    fn test_sample_store_is_populated() {
        let store = InMemoryDataStore::sample();
        assert!(!store.is_empty());
        let all = store.all();
        let mut ids: Vec<_> = all.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
    }
}
