//! Observable user preferences.
//!
//! Values are resolved through two layers: explicit values set by the user
//! (persisted) over registered defaults (volatile, re-registered at every
//! launch from the settings bundle). Observers subscribe per key and are
//! told only when the effective value of that key changes.

use parking_lot::RwLock;
use recipekit_core::{Describe, DiagnosticSink, HandlerResult, SubscriberRegistry, Subscription};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::SettingsResult;
use crate::persistence::PreferencesFile;

/// Key of the recipe title tint preference
pub const NAME_COLOR_KEY: &str = "nameColorKey";

/// A stored preference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PreferenceValue {
    /// Integer reading of the value, converting where a sensible reading exists
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PreferenceValue::Bool(b) => Some(i64::from(*b)),
            PreferenceValue::Integer(i) => Some(*i),
            PreferenceValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            PreferenceValue::Float(_) => None,
            PreferenceValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            PreferenceValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PreferenceValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferenceValue::Bool(b) => write!(f, "{}", b),
            PreferenceValue::Integer(i) => write!(f, "{}", i),
            PreferenceValue::Float(v) => write!(f, "{}", v),
            PreferenceValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Integer(value)
    }
}

impl From<f64> for PreferenceValue {
    fn from(value: f64) -> Self {
        PreferenceValue::Float(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::Text(value.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::Text(value)
    }
}

/// Change of a key's effective value
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceChange {
    pub key: String,
    pub old: Option<PreferenceValue>,
    pub new: Option<PreferenceValue>,
}

impl Describe for PreferenceChange {
    fn describe(&self) -> String {
        let show = |v: &Option<PreferenceValue>| match v {
            Some(value) => value.to_string(),
            None => "unset".to_string(),
        };
        format!("{}: {} -> {}", self.key, show(&self.old), show(&self.new))
    }
}

/// Callback receiving the new effective value of an observed key
pub type PreferenceObserver = Box<dyn Fn(Option<&PreferenceValue>) -> HandlerResult + Send + Sync>;

/// Key-value preference storage with per-key change observation
pub trait PreferenceStore: Send + Sync {
    /// Effective value of `key`
    fn get(&self, key: &str) -> Option<PreferenceValue>;

    /// Integer value of `key`; 0 when unset or not convertible
    fn integer(&self, key: &str) -> i64 {
        self.get(key)
            .and_then(|value| value.as_integer())
            .unwrap_or(0)
    }

    /// Set an explicit value
    fn set(&self, key: &str, value: PreferenceValue);

    /// Remove the explicit value, falling back to the registered default
    fn remove(&self, key: &str);

    /// Register volatile defaults
    fn register_defaults(&self, defaults: BTreeMap<String, PreferenceValue>);

    /// Observe changes of `key`
    fn subscribe(&self, key: &str, observer: PreferenceObserver) -> Subscription;

    /// Observe `key`, delivering its current value once before returning
    fn observe(&self, key: &str, observer: PreferenceObserver) -> Subscription;
}

/// Observe `key`, calling `handler` once with the current value and then on
/// every change.
pub fn observe_initial<F>(store: &dyn PreferenceStore, key: &str, handler: F) -> Subscription
where
    F: Fn(Option<&PreferenceValue>) -> HandlerResult + Send + Sync + 'static,
{
    store.observe(key, Box::new(handler))
}

#[derive(Debug, Default)]
struct Layers {
    defaults: BTreeMap<String, PreferenceValue>,
    values: BTreeMap<String, PreferenceValue>,
}

impl Layers {
    fn effective(&self, key: &str) -> Option<PreferenceValue> {
        self.values
            .get(key)
            .or_else(|| self.defaults.get(key))
            .cloned()
    }
}

/// In-process preference store with a defaults layer
pub struct UserPreferences {
    layers: RwLock<Layers>,
    changes: SubscriberRegistry<PreferenceChange>,
}

impl UserPreferences {
    pub fn new() -> Self {
        Self::from_registry(SubscriberRegistry::new("preferences"))
    }

    /// Report failing observers to `sink`
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::from_registry(SubscriberRegistry::with_sink("preferences", sink))
    }

    fn from_registry(changes: SubscriberRegistry<PreferenceChange>) -> Self {
        Self {
            layers: RwLock::new(Layers::default()),
            changes,
        }
    }

    /// Explicit values, the part that gets persisted
    pub fn persisted_values(&self) -> BTreeMap<String, PreferenceValue> {
        self.layers.read().values.clone()
    }

    /// Registered defaults
    pub fn defaults(&self) -> BTreeMap<String, PreferenceValue> {
        self.layers.read().defaults.clone()
    }

    /// Replace the explicit values, notifying every key whose effective
    /// value changed.
    pub fn load_values(&self, values: BTreeMap<String, PreferenceValue>) {
        let changes = {
            let mut layers = self.layers.write();
            let mut keys: Vec<String> = layers.values.keys().cloned().collect();
            keys.extend(values.keys().cloned());
            keys.sort();
            keys.dedup();

            let before: Vec<Option<PreferenceValue>> =
                keys.iter().map(|key| layers.effective(key)).collect();
            layers.values = values;
            collect_changes(&layers, keys, before)
        };
        self.notify(changes);
    }

    /// Load explicit values from a preferences file
    pub fn load_from_file(&self, path: &Path) -> SettingsResult<usize> {
        let file = PreferencesFile::load(path)?;
        let count = file.values.len();
        self.load_values(file.values);
        tracing::info!("Loaded {} preference(s) from {}", count, path.display());
        Ok(count)
    }

    /// Save explicit values to a preferences file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        PreferencesFile::new(self.persisted_values()).save(path)?;
        tracing::debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// Number of active key observers
    pub fn observer_count(&self) -> usize {
        self.changes.subscriber_count()
    }

    fn notify(&self, changes: Vec<PreferenceChange>) {
        for change in changes {
            tracing::debug!("Preference changed: {}", change.describe());
            self.changes.publish(change);
        }
    }

    fn apply<F>(&self, key: &str, mutate: F)
    where
        F: FnOnce(&mut Layers),
    {
        let change = {
            let mut layers = self.layers.write();
            let old = layers.effective(key);
            mutate(&mut layers);
            let new = layers.effective(key);
            (old != new).then(|| PreferenceChange {
                key: key.to_string(),
                old,
                new,
            })
        };
        self.notify(change.into_iter().collect());
    }
}

fn collect_changes(
    layers: &Layers,
    keys: Vec<String>,
    before: Vec<Option<PreferenceValue>>,
) -> Vec<PreferenceChange> {
    keys.into_iter()
        .zip(before)
        .filter_map(|(key, old)| {
            let new = layers.effective(&key);
            (old != new).then_some(PreferenceChange { key, old, new })
        })
        .collect()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for UserPreferences {
    fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.layers.read().effective(key)
    }

    fn set(&self, key: &str, value: PreferenceValue) {
        self.apply(key, |layers| {
            layers.values.insert(key.to_string(), value);
        });
    }

    fn remove(&self, key: &str) {
        self.apply(key, |layers| {
            layers.values.remove(key);
        });
    }

    fn register_defaults(&self, defaults: BTreeMap<String, PreferenceValue>) {
        let changes = {
            let mut layers = self.layers.write();
            let keys: Vec<String> = defaults.keys().cloned().collect();
            let before: Vec<Option<PreferenceValue>> =
                keys.iter().map(|key| layers.effective(key)).collect();
            layers.defaults.extend(defaults);
            collect_changes(&layers, keys, before)
        };
        self.notify(changes);
    }

    fn subscribe(&self, key: &str, observer: PreferenceObserver) -> Subscription {
        let key = key.to_string();
        self.changes.subscribe_filtered(
            move |change: &PreferenceChange| change.key == key,
            move |change: &PreferenceChange| observer(change.new.as_ref()),
        )
    }

    fn observe(&self, key: &str, observer: PreferenceObserver) -> Subscription {
        let current = PreferenceChange {
            key: key.to_string(),
            old: None,
            new: self.get(key),
        };
        let key = key.to_string();
        self.changes.subscribe_filtered_with_initial(
            move |change: &PreferenceChange| change.key == key,
            move |change: &PreferenceChange| observer(change.new.as_ref()),
            &current,
        )
    }
}

impl std::fmt::Debug for UserPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let layers = self.layers.read();
        f.debug_struct("UserPreferences")
            .field("defaults", &layers.defaults.len())
            .field("values", &layers.values.len())
            .field("observers", &self.changes.subscriber_count())
            .finish()
    }
}

/// Tint applied to recipe titles, chosen by `nameColorKey`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundTint {
    #[default]
    Blue,
    Teal,
    Indigo,
}

impl BackgroundTint {
    /// Map a raw preference value; anything unrecognised is Blue
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            2 => BackgroundTint::Teal,
            3 => BackgroundTint::Indigo,
            _ => BackgroundTint::Blue,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            BackgroundTint::Blue => 1,
            BackgroundTint::Teal => 2,
            BackgroundTint::Indigo => 3,
        }
    }

    /// Tint for an observed preference value
    pub fn from_value(value: Option<&PreferenceValue>) -> Self {
        value
            .and_then(PreferenceValue::as_integer)
            .map(Self::from_raw)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            BackgroundTint::Blue => "Blue",
            BackgroundTint::Teal => "Teal",
            BackgroundTint::Indigo => "Indigo",
        }
    }
}

impl std::fmt::Display for BackgroundTint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use recipekit_core::FailureLog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn defaults(pairs: &[(&str, i64)]) -> BTreeMap<String, PreferenceValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), PreferenceValue::Integer(*v)))
            .collect()
    }

    #[test]
    fn test_explicit_value_overrides_default() {
        let prefs = UserPreferences::new();
        prefs.register_defaults(defaults(&[(NAME_COLOR_KEY, 1)]));
        assert_eq!(prefs.integer(NAME_COLOR_KEY), 1);

        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(3));
        assert_eq!(prefs.integer(NAME_COLOR_KEY), 3);

        prefs.remove(NAME_COLOR_KEY);
        assert_eq!(prefs.integer(NAME_COLOR_KEY), 1);
    }

    #[test]
    fn test_integer_of_unset_key_is_zero() {
        let prefs = UserPreferences::new();
        assert_eq!(prefs.integer("missing"), 0);
        prefs.set("flag", true.into());
        assert_eq!(prefs.integer("flag"), 1);
        prefs.set("word", "not a number".into());
        assert_eq!(prefs.integer("word"), 0);
    }

    #[test]
    fn test_defaults_are_not_persisted() {
        let prefs = UserPreferences::new();
        prefs.register_defaults(defaults(&[(NAME_COLOR_KEY, 1)]));
        assert!(prefs.persisted_values().is_empty());

        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(2));
        assert_eq!(
            prefs.persisted_values().get(NAME_COLOR_KEY),
            Some(&PreferenceValue::Integer(2))
        );
    }

    #[test]
    fn test_notifies_only_on_effective_change() {
        let prefs = UserPreferences::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _sub = prefs.subscribe(
            NAME_COLOR_KEY,
            Box::new(move |value: Option<&PreferenceValue>| {
                s.lock().push(value.cloned());
                Ok(())
            }),
        );

        prefs.register_defaults(defaults(&[(NAME_COLOR_KEY, 1)]));
        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(1));
        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(2));
        prefs.set("other", PreferenceValue::Integer(9));
        prefs.remove(NAME_COLOR_KEY);

        assert_eq!(
            *seen.lock(),
            vec![
                Some(PreferenceValue::Integer(1)),
                Some(PreferenceValue::Integer(2)),
                Some(PreferenceValue::Integer(1)),
            ]
        );
    }

    #[test]
    fn test_defaults_under_explicit_value_do_not_notify() {
        let prefs = UserPreferences::new();
        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(2));

        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _sub = prefs.subscribe(
            NAME_COLOR_KEY,
            Box::new(move |_: Option<&PreferenceValue>| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        prefs.register_defaults(defaults(&[(NAME_COLOR_KEY, 1)]));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_observe_initial_delivers_current_then_changes() {
        let prefs = UserPreferences::new();
        prefs.register_defaults(defaults(&[(NAME_COLOR_KEY, 1)]));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let sub = observe_initial(&prefs, NAME_COLOR_KEY, move |value| {
            s.lock().push(BackgroundTint::from_value(value));
            Ok(())
        });

        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(2));
        sub.release();
        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(3));

        assert_eq!(
            *seen.lock(),
            vec![BackgroundTint::Blue, BackgroundTint::Teal]
        );
    }

    #[test]
    fn test_observe_initial_isolates_a_failing_first_call() {
        let failures = FailureLog::new(4);
        let prefs = UserPreferences::with_sink(Arc::new(failures.clone()));
        prefs.register_defaults(defaults(&[(NAME_COLOR_KEY, 1)]));

        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _sub = observe_initial(&prefs, NAME_COLOR_KEY, move |value| {
            c.fetch_add(1, Ordering::SeqCst);
            if value.and_then(|v| v.as_integer()) == Some(1) {
                panic!("cannot tint");
            }
            Ok(())
        });

        assert_eq!(failures.total(), 1);
        assert_eq!(failures.recent()[0].channel, "preferences");

        prefs.set(NAME_COLOR_KEY, PreferenceValue::Integer(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(failures.total(), 1);
    }

    #[test]
    fn test_load_values_notifies_changed_keys() {
        let prefs = UserPreferences::new();
        prefs.set("a", PreferenceValue::Integer(1));
        prefs.set("b", PreferenceValue::Integer(2));

        let changed = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Vec::new();
        for key in ["a", "b", "c"] {
            let c = Arc::clone(&changed);
            subs.push(prefs.subscribe(
                key,
                Box::new(move |_: Option<&PreferenceValue>| {
                    c.lock().push(key);
                    Ok(())
                }),
            ));
        }

        let mut values = BTreeMap::new();
        values.insert("b".to_string(), PreferenceValue::Integer(2));
        values.insert("c".to_string(), PreferenceValue::Integer(5));
        prefs.load_values(values);

        assert_eq!(*changed.lock(), vec!["a", "c"]);
        assert_eq!(prefs.get("a"), None);
    }

    #[test]
    fn test_tint_mapping() {
        assert_eq!(BackgroundTint::from_raw(1), BackgroundTint::Blue);
        assert_eq!(BackgroundTint::from_raw(2), BackgroundTint::Teal);
        assert_eq!(BackgroundTint::from_raw(3), BackgroundTint::Indigo);
        assert_eq!(BackgroundTint::from_raw(0), BackgroundTint::Blue);
        assert_eq!(BackgroundTint::from_raw(42), BackgroundTint::Blue);
        assert_eq!(BackgroundTint::from_value(None), BackgroundTint::Blue);
        assert_eq!(BackgroundTint::Indigo.raw(), 3);
        assert_eq!(BackgroundTint::Teal.to_string(), "Teal");
    }

    #[test]
    fn test_untagged_values_round_trip_through_json() {
        let json = r#"{"a": 1, "b": true, "c": 1.5, "d": "x"}"#;
        let values: BTreeMap<String, PreferenceValue> =
            serde_json::from_str(json).expect("valid json");
        assert_eq!(values["a"], PreferenceValue::Integer(1));
        assert_eq!(values["b"], PreferenceValue::Bool(true));
        assert_eq!(values["c"], PreferenceValue::Float(1.5));
        assert_eq!(values["d"], PreferenceValue::Text("x".to_string()));
    }
}
