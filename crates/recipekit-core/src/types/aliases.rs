//! Type aliases for commonly used complex types.
//!
//! Presenters, stores and surfaces all share state across subscription
//! handlers, which must be `Send + Sync`. These aliases name the two
//! shapes that sharing takes so the intent is visible at the use site.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recipekit_core::types::*;
//!
//! // Instead of: Arc<Mutex<PresenterState>>
//! let state: ThreadSafe<PresenterState> = thread_safe(PresenterState::default());
//! ```

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex`, which does not poison when a holder panics.
///
/// # Example
/// ```rust,ignore
/// let state: ThreadSafe<AppState> = thread_safe(AppState::default());
/// state.lock().update();
/// ```
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer lock wrapper for read-heavy workloads.
///
/// Use when reads greatly outnumber writes, such as the recipe collection
/// or the preference layers.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeRw<T>` from a value.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
