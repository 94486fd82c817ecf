//! # In-Memory Event Log
//!
//! `EventSink` that keeps every published event, giving tests and the replay
//! tool an audit trail of committed transitions.

use crate::events::RecoveryEvent;
use crate::ports::outbound::EventSink;
use parking_lot::Mutex;
use tracing::trace;

/// Append-only event log.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<RecoveryEvent>>,
}

impl InMemoryEventLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecoveryEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all events.
    pub fn drain(&self) -> Vec<RecoveryEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of logged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for InMemoryEventLog {
    fn publish(&self, event: RecoveryEvent) {
        trace!(topic = event.topic(), "event logged");
        self.events.lock().push(event);
    }
}
