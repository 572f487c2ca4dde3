//! Event Bus implementation.
//!
//! Provides the injectable EventBus struct for application-wide event
//! distribution. There is no process-global instance; every
//! component receives the bus it talks to.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use super::diagnostics::{FailureLog, HandlerFailure};
use super::events::{AppEvent, EventKind};
use super::registry::{HandlerResult, SubscriberRegistry, Subscription, SubscriptionId};
use crate::types::{thread_safe_rw, ThreadSafeRw};

/// Filter to receive only specific event kinds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these kinds.
    Kinds(Vec<EventKind>),
}

impl EventFilter {
    /// Filter for exactly one kind
    pub fn only(kind: EventKind) -> Self {
        EventFilter::Kinds(vec![kind])
    }

    /// Check if an event matches this filter
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Kinds(kinds) => kinds.contains(&event.kind()),
        }
    }
}

/// Tuning knobs for an [`EventBus`]
#[derive(Debug, Clone, PartialEq)]
pub struct EventBusConfig {
    /// Buffer size of the broadcast channel behind `receiver()`.
    pub channel_capacity: usize,
    pub enable_history: bool,
    /// Oldest events are evicted beyond this count.
    pub max_history_size: usize,
    /// Events older than this are evicted on the next publish.
    pub history_retention: Duration,
    /// Maximum number of handler failures kept for inspection.
    pub max_recorded_failures: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 1000,
            history_retention: Duration::from_secs(300),
            max_recorded_failures: 64,
        }
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    event: AppEvent,
    at: Instant,
}

/// Typed command and notification bus shared by the presenter and every
/// command surface.
pub struct EventBus {
    registry: SubscriberRegistry<AppEvent>,
    sender: broadcast::Sender<AppEvent>,
    history: ThreadSafeRw<VecDeque<Recorded>>,
    failures: FailureLog,
    config: EventBusConfig,
}

impl EventBus {
    /// A bus with default settings
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        let failures = FailureLog::new(config.max_recorded_failures);
        Self {
            registry: SubscriberRegistry::with_sink("event-bus", Arc::new(failures.clone())),
            sender,
            history: thread_safe_rw(VecDeque::new()),
            failures,
            config,
        }
    }

    /// Deliver `event` to every matching subscriber.
    ///
    /// Handlers run synchronously in registration order. Returns the number
    /// of synchronous subscribers the event was addressed to; zero is not
    /// an error.
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::trace!("Publishing {}", event.description());

        if self.config.enable_history {
            self.record(&event);
        }

        // Async receivers are optional; a send error only means none exist.
        let _ = self.sender.send(event.clone());

        self.registry.publish(event)
    }

    /// Register a handler for events accepted by `filter`.
    ///
    /// The handler runs on the publishing thread (or on the thread draining
    /// an in-progress dispatch), so it should return quickly.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) -> HandlerResult + Send + Sync + 'static,
    {
        match filter {
            EventFilter::All => self.registry.subscribe(handler),
            filter => self
                .registry
                .subscribe_filtered(move |event| filter.matches(event), handler),
        }
    }

    /// Shorthand for a single-kind filter
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(EventFilter::only(kind), handler)
    }

    /// A broadcast receiver for tokio tasks that want to watch the bus.
    /// Receivers that fall behind see `RecvError::Lagged`.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Remove a handler by id; false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }

    /// Handlers currently registered
    pub fn subscriber_count(&self) -> usize {
        self.registry.subscriber_count()
    }

    /// Recent handler failures, oldest first
    pub fn failures(&self) -> Vec<HandlerFailure> {
        self.failures.recent()
    }

    /// Number of handler failures since the bus was created
    pub fn failure_count(&self) -> u64 {
        self.failures.total()
    }

    /// Retained events published at or after `since` (all when `None`).
    /// Empty unless `enable_history` is set.
    pub fn history(&self, since: Option<Instant>) -> Vec<AppEvent> {
        self.history
            .read()
            .iter()
            .filter(|recorded| since.is_none_or(|since| recorded.at >= since))
            .map(|recorded| recorded.event.clone())
            .collect()
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn record(&self, event: &AppEvent) {
        let now = Instant::now();
        let retention = self.config.history_retention;
        let mut history = self.history.write();

        history.push_back(Recorded {
            event: event.clone(),
            at: now,
        });
        let expired = history
            .iter()
            .take_while(|recorded| now.duration_since(recorded.at) > retention)
            .count();
        let overflow = history
            .len()
            .saturating_sub(expired)
            .saturating_sub(self.config.max_history_size);
        history.drain(..expired + overflow);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{ActivityItemsConfiguration, CommandSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn edit(source: CommandSource) -> AppEvent {
        AppEvent::EditRecipe { source }
    }

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.failure_count(), 0);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let sub = bus.subscribe(EventFilter::All, |_| Ok(()));
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(sub.id()));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(sub.id()));
        assert!(!sub.release());
    }

    #[test]
    fn test_event_delivery() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let _sub = bus.subscribe(EventFilter::All, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(bus.publish(edit(CommandSource::Toolbar)), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(
            bus.publish(AppEvent::ToggleRecipeIsFavorite {
                source: CommandSource::Toolbar
            }),
            0
        );
        assert_eq!(bus.failure_count(), 0);
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let edit_count = Arc::new(AtomicUsize::new(0));
        let share_count = Arc::new(AtomicUsize::new(0));

        let ec = edit_count.clone();
        let _edit = bus.on(EventKind::EditRecipe, move |_| {
            ec.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let sc = share_count.clone();
        let _share = bus.subscribe(
            EventFilter::Kinds(vec![
                EventKind::ActivityItemsConfigurationDidChange,
                EventKind::NewRecipe,
            ]),
            move |_| {
                sc.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );

        bus.publish(edit(CommandSource::MenuBar));
        bus.publish(AppEvent::ActivityItemsConfigurationDidChange {
            configuration: Some(ActivityItemsConfiguration {
                title: "Pie".to_string(),
                image_name: "pie".to_string(),
            }),
        });
        bus.publish(AppEvent::DeleteRecipe {
            source: CommandSource::MenuBar,
        });

        assert_eq!(edit_count.load(Ordering::SeqCst), 1);
        assert_eq!(share_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_are_recorded() {
        let bus = EventBus::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        let _broken = bus.on(EventKind::EditRecipe, |_| anyhow::bail!("editor unavailable"));
        let d = delivered.clone();
        let _working = bus.on(EventKind::EditRecipe, move |_| {
            d.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(edit(CommandSource::InlineButton));

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(bus.failure_count(), 1);
        let failures = bus.failures();
        assert_eq!(failures[0].channel, "event-bus");
        assert_eq!(failures[0].event, "editRecipe from inline button");
    }

    #[test]
    fn test_event_history() {
        let config = EventBusConfig {
            enable_history: true,
            max_history_size: 10,
            ..Default::default()
        };
        let bus = EventBus::with_config(config);

        for _ in 0..5 {
            bus.publish(edit(CommandSource::Toolbar));
        }

        assert_eq!(bus.history(None).len(), 5);

        bus.clear_history();
        assert_eq!(bus.history(None).len(), 0);
    }

    #[test]
    fn test_history_max_size() {
        let config = EventBusConfig {
            enable_history: true,
            max_history_size: 5,
            ..Default::default()
        };
        let bus = EventBus::with_config(config);

        for _ in 0..10 {
            bus.publish(edit(CommandSource::Toolbar));
        }

        assert_eq!(bus.history(None).len(), 5);
    }

    #[test]
    fn test_history_disabled_by_default() {
        let bus = EventBus::new();
        bus.publish(edit(CommandSource::Toolbar));
        assert!(bus.history(None).is_empty());
    }

    #[test]
    fn test_filter_matches() {
        let event = edit(CommandSource::Toolbar);

        assert!(EventFilter::All.matches(&event));
        assert!(EventFilter::only(EventKind::EditRecipe).matches(&event));
        assert!(!EventFilter::only(EventKind::NewRecipe).matches(&event));
        assert!(
            EventFilter::Kinds(vec![EventKind::NewRecipe, EventKind::EditRecipe]).matches(&event)
        );
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(AppEvent::NewRecipe {
            source: CommandSource::MenuBar,
        });

        match receiver.try_recv() {
            Ok(AppEvent::NewRecipe { source }) => assert_eq!(source, CommandSource::MenuBar),
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
