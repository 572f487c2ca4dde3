//! # Event Bus Module
//!
//! Provides the publish/subscribe plumbing used for decoupled communication
//! between command surfaces, presenters and stores.
//!
//! ## Overview
//!
//! - [`SubscriberRegistry`] is the generic fan-out primitive. The event bus,
//!   the recipe store and the preference store are all built on it.
//! - [`EventBus`] carries typed [`AppEvent`]s. It is an ordinary value that
//!   gets passed around as `Arc<EventBus>`; there is no global instance.
//! - Every `subscribe` returns a [`Subscription`] that unregisters itself
//!   when released or dropped.
//!
//! ## Delivery guarantees
//!
//! 1. Subscribers receive an event in registration order.
//! 2. The subscriber set is snapshotted at publish time; a subscriber
//!    added while an event is being dispatched does not receive it.
//! 3. A publish issued from inside a handler is queued and delivered after
//!    the current event has reached every subscriber.
//! 4. A released subscription receives nothing further, including events
//!    already in flight.
//! 5. A failing or panicking handler does not stop delivery to the rest;
//!    the failure goes to the [`DiagnosticSink`].
//! 6. Publishing with no subscribers is a silent no-op.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recipekit_core::event_bus::{AppEvent, CommandSource, EventBus, EventKind};
//!
//! let bus = EventBus::new();
//! let subscription = bus.on(EventKind::EditRecipe, |event| {
//!     println!("edit requested: {}", event.description());
//!     Ok(())
//! });
//!
//! bus.publish(AppEvent::EditRecipe { source: CommandSource::Toolbar });
//!
//! // Unsubscribe when done (dropping the handle does the same)
//! subscription.release();
//! ```

mod bus;
mod diagnostics;
mod events;
mod registry;

pub use bus::*;
pub use diagnostics::*;
pub use events::*;
pub use registry::*;
