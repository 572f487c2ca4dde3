//! Subscriber registry.
//!
//! Ordered fan-out with snapshot-at-publish, a dispatch queue for
//! re-entrant and cross-thread publishes, and per-handler failure isolation.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use uuid::Uuid;

use super::diagnostics::{DiagnosticSink, HandlerFailure};
use crate::error::EventBusError;

/// Result returned by every subscription handler.
pub type HandlerResult = anyhow::Result<()>;

type Handler<E> = Box<dyn Fn(&E) -> HandlerResult + Send + Sync>;
type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// Short, log-friendly description of a published value.
pub trait Describe {
    /// One-line description used in logs and failure reports.
    fn describe(&self) -> String;
}

/// Subscription handle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Type-erased removal, so one handle type serves every registry.
trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Registration returned by `subscribe`.
///
/// Releasing is idempotent; the second and later calls do nothing. Dropping
/// the handle releases it, so a component that owns its subscriptions stops
/// receiving as soon as it is torn down.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    owner: Weak<dyn Unsubscribe>,
    released: AtomicBool,
}

impl Subscription {
    /// The identifier of this registration
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unregister the handler.
    ///
    /// Returns true only for the call that actually removed it.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.owner
            .upgrade()
            .is_some_and(|owner| owner.unsubscribe(self.id))
    }

    /// Whether `release` has been called (or the handle dropped)
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}

/// A bag of subscriptions owned by one component.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl SubscriptionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a subscription
    pub fn push(&self, subscription: Subscription) {
        self.subscriptions.lock().push(subscription);
    }

    /// Number of subscriptions held
    pub fn len(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Whether the set holds no subscriptions
    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }

    /// Release and forget every subscription. Safe to call repeatedly.
    pub fn release_all(&self) {
        let drained: Vec<Subscription> = std::mem::take(&mut *self.subscriptions.lock());
        for subscription in &drained {
            subscription.release();
        }
    }
}

struct Entry<E> {
    id: SubscriptionId,
    active: AtomicBool,
    predicate: Option<Predicate<E>>,
    handler: Handler<E>,
}

impl<E> Entry<E> {
    fn accepts(&self, value: &E) -> bool {
        self.active.load(Ordering::Acquire) && self.predicate.as_ref().is_none_or(|p| p(value))
    }
}

struct Envelope<E> {
    value: E,
    targets: Vec<Arc<Entry<E>>>,
}

struct DispatchQueue<E> {
    pending: VecDeque<Envelope<E>>,
    draining: bool,
}

struct RegistryInner<E> {
    channel: &'static str,
    entries: RwLock<Vec<Arc<Entry<E>>>>,
    queue: Mutex<DispatchQueue<E>>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl<E: Send + Sync + 'static> Unsubscribe for RegistryInner<E> {
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = entries.remove(index);
        entry.active.store(false, Ordering::Release);
        tracing::debug!(channel = self.channel, "Subscription {} removed", id);
        true
    }
}

/// Ordered publish/subscribe registry for values of type `E`.
///
/// Handlers run on whichever thread drains the dispatch queue, never while
/// a registry lock is held, so handlers may subscribe, release, or publish.
/// When a publish arrives while another publish is draining (from a handler
/// on the same thread, or from another thread), it is queued and delivered
/// by the active drainer once the current event has finished.
pub struct SubscriberRegistry<E> {
    inner: Arc<RegistryInner<E>>,
}

impl<E: Describe + Send + Sync + 'static> SubscriberRegistry<E> {
    /// Create a registry; `channel` names it in logs and failure reports.
    pub fn new(channel: &'static str) -> Self {
        Self::build(channel, None)
    }

    /// Create a registry that forwards handler failures to `sink`.
    pub fn with_sink(channel: &'static str, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::build(channel, Some(sink))
    }

    fn build(channel: &'static str, sink: Option<Arc<dyn DiagnosticSink>>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                channel,
                entries: RwLock::new(Vec::new()),
                queue: Mutex::new(DispatchQueue {
                    pending: VecDeque::new(),
                    draining: false,
                }),
                sink,
            }),
        }
    }

    /// Register a handler for every published value
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(None, Box::new(handler))
    }

    /// Register a handler for values accepted by `predicate`
    pub fn subscribe_filtered<P, F>(&self, predicate: P, handler: F) -> Subscription
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Some(Box::new(predicate)), Box::new(handler))
    }

    /// Register a filtered handler and hand it `initial` before returning.
    ///
    /// The initial value goes to this handler only, bypassing `predicate`,
    /// with the same failure isolation and reporting as a publish.
    pub fn subscribe_filtered_with_initial<P, F>(
        &self,
        predicate: P,
        handler: F,
        initial: &E,
    ) -> Subscription
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        let (entry, subscription) = self.insert(Some(Box::new(predicate)), Box::new(handler));
        self.inner.deliver(initial, std::slice::from_ref(&entry));
        subscription
    }

    fn register(&self, predicate: Option<Predicate<E>>, handler: Handler<E>) -> Subscription {
        self.insert(predicate, handler).1
    }

    fn insert(
        &self,
        predicate: Option<Predicate<E>>,
        handler: Handler<E>,
    ) -> (Arc<Entry<E>>, Subscription) {
        let id = SubscriptionId::new();
        let entry = Arc::new(Entry {
            id,
            active: AtomicBool::new(true),
            predicate,
            handler,
        });
        self.inner.entries.write().push(Arc::clone(&entry));
        tracing::debug!(channel = self.inner.channel, "Subscription {} added", id);

        let owner: Weak<dyn Unsubscribe> = Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        let subscription = Subscription {
            id,
            owner,
            released: AtomicBool::new(false),
        };
        (entry, subscription)
    }

    /// Unregister by id. Returns true if the subscription was found.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Publish a value.
    ///
    /// Returns the number of subscribers in the publish-time snapshot. With
    /// zero subscribers nothing is queued and nothing happens.
    pub fn publish(&self, value: E) -> usize {
        let targets: Vec<Arc<Entry<E>>> = self
            .inner
            .entries
            .read()
            .iter()
            .filter(|entry| entry.accepts(&value))
            .cloned()
            .collect();

        let count = targets.len();
        if count == 0 {
            tracing::trace!(
                channel = self.inner.channel,
                "No subscribers for {}",
                value.describe()
            );
            return 0;
        }

        {
            let mut queue = self.inner.queue.lock();
            queue.pending.push_back(Envelope { value, targets });
            if queue.draining {
                return count;
            }
            queue.draining = true;
        }

        self.inner.drain();
        count
    }
}

/// Clears `draining` when delivery unwinds out of `drain`.
struct DrainGuard<'a, E> {
    queue: &'a Mutex<DispatchQueue<E>>,
    finished: bool,
}

impl<E> Drop for DrainGuard<'_, E> {
    fn drop(&mut self) {
        if !self.finished {
            self.queue.lock().draining = false;
        }
    }
}

impl<E: Describe + Send + Sync + 'static> RegistryInner<E> {
    fn drain(&self) {
        let mut guard = DrainGuard {
            queue: &self.queue,
            finished: false,
        };
        loop {
            let envelope = {
                let mut queue = self.queue.lock();
                match queue.pending.pop_front() {
                    Some(envelope) => envelope,
                    None => {
                        queue.draining = false;
                        guard.finished = true;
                        return;
                    }
                }
            };
            self.deliver(&envelope.value, &envelope.targets);
        }
    }

    fn deliver(&self, value: &E, targets: &[Arc<Entry<E>>]) {
        for entry in targets {
            // Released after the snapshot was taken.
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| (entry.handler)(value)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => EventBusError::HandlerFailed {
                    subscription: entry.id.to_string(),
                    message: format!("{err:#}"),
                },
                Err(payload) => EventBusError::HandlerPanicked {
                    subscription: entry.id.to_string(),
                    message: panic_message(payload.as_ref()),
                },
            };
            self.report(entry.id, value, error);
        }
    }

    fn report(&self, subscription: SubscriptionId, value: &E, error: EventBusError) {
        let failure = HandlerFailure {
            channel: self.channel,
            subscription,
            event: value.describe(),
            error,
            at: Utc::now(),
        };
        tracing::error!(
            channel = self.channel,
            event = %failure.event,
            "{}",
            failure.error
        );
        if let Some(sink) = &self.sink {
            sink.handler_failed(&failure);
        }
    }
}

impl<E> Clone for SubscriberRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> std::fmt::Debug for SubscriberRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("channel", &self.inner.channel)
            .field("subscribers", &self.inner.entries.read().len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
