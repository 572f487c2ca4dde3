//! Diagnostic sink for subscriber failures.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::registry::SubscriptionId;
use crate::error::EventBusError;
use crate::types::{thread_safe, ThreadSafe};

/// A subscriber failure observed during dispatch.
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    /// Registry the failing subscriber belonged to (e.g. "event-bus").
    pub channel: &'static str,
    /// The subscriber that failed.
    pub subscription: SubscriptionId,
    /// Short description of the value being delivered.
    pub event: String,
    /// What went wrong.
    pub error: EventBusError,
    /// When the failure was observed.
    pub at: DateTime<Utc>,
}

/// Receives subscriber failures. Implementations must not publish back
/// into the registry that reported the failure.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per failed handler invocation.
    fn handler_failed(&self, failure: &HandlerFailure);
}

/// Bounded in-memory record of recent failures.
///
/// Cloning shares the underlying buffer.
#[derive(Debug, Clone)]
pub struct FailureLog {
    entries: ThreadSafe<VecDeque<HandlerFailure>>,
    total: ThreadSafe<u64>,
    capacity: usize,
}

impl FailureLog {
    /// Create a log that keeps at most `capacity` failures
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: thread_safe(VecDeque::with_capacity(capacity.min(64))),
            total: thread_safe(0),
            capacity,
        }
    }

    /// Most recent failures, oldest first
    pub fn recent(&self) -> Vec<HandlerFailure> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Number of failures ever recorded, including evicted ones
    pub fn total(&self) -> u64 {
        *self.total.lock()
    }

    /// Drop all retained failures (the total is kept)
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for FailureLog {
    fn default() -> Self {
        Self::new(64)
    }
}

impl DiagnosticSink for FailureLog {
    fn handler_failed(&self, failure: &HandlerFailure) {
        *self.total.lock() += 1;
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(failure.clone());
    }
}
