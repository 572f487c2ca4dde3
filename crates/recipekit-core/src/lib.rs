//! # RecipeKit Core
//!
//! Core types, traits, and utilities for RecipeKit.
//! Provides the recipe model, the data store seam, the subscriber
//! registry that every observable in the workspace is built on, and the
//! application event bus.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod types;

pub use data::{DataStore, InMemoryDataStore, Recipe, RecipeId, RecipeSnapshot, RecordsObserver};

pub use error::{Error, EventBusError, Result, StoreError};

// Re-export event bus for convenience
pub use event_bus::{
    ActivityItemsConfiguration, AppEvent, CommandSource, Describe, DiagnosticSink, EventBus,
    EventBusConfig, EventFilter, EventKind, FailureLog, HandlerFailure, HandlerResult,
    MetadataKey, RecipeAction, SubscriberRegistry, Subscription, SubscriptionId, SubscriptionSet,
};

pub use types::{thread_safe, thread_safe_rw, ThreadSafe, ThreadSafeRw};
