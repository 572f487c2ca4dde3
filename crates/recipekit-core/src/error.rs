//! Error handling for RecipeKit
//!
//! Provides error types for the core layers of the application:
//! - Store errors (writes against the authoritative recipe collection)
//! - Event bus errors (subscriber failures during dispatch)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::data::RecipeId;

/// Data store error type
///
/// Represents failures of writes against the recipe collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write references an identity that is no longer in the store.
    ///
    /// Callers treat this as "the record is gone", not as a user-facing failure.
    #[error("Recipe {id} is no longer in the store")]
    MissingTarget {
        /// Identity the write was aimed at.
        id: RecipeId,
    },
}

/// Event bus error type
///
/// Describes a subscriber that failed while an event was being dispatched.
/// These never abort delivery; they are reported to the diagnostic sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventBusError {
    /// A handler returned an error
    #[error("Handler {subscription} failed: {message}")]
    HandlerFailed {
        /// Display form of the failing subscription.
        subscription: String,
        /// The error chain rendered as text.
        message: String,
    },

    /// A handler panicked
    #[error("Handler {subscription} panicked: {message}")]
    HandlerPanicked {
        /// Display form of the failing subscription.
        subscription: String,
        /// The panic payload, when it was a string.
        message: String,
    },
}

/// Main error type for RecipeKit
///
/// A unified error type that can represent any error from the core layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Event bus error
    #[error(transparent)]
    EventBus(#[from] EventBusError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error means the targeted recipe disappeared
    pub fn is_missing_target(&self) -> bool {
        matches!(self, Error::Store(StoreError::MissingTarget { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::MissingTarget { id: RecipeId(42) };
        assert_eq!(err.to_string(), "Recipe #42 is no longer in the store");
    }

    #[test]
    fn test_event_bus_error_display() {
        let err = EventBusError::HandlerFailed {
            subscription: "Sub(1234abcd)".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Handler Sub(1234abcd) failed: boom");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = StoreError::MissingTarget { id: RecipeId(7) }.into();
        assert!(err.is_missing_target());

        let err = Error::other("something else");
        assert!(!err.is_missing_target());
        assert_eq!(err.to_string(), "something else");
    }
}
