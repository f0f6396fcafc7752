//! Thread-safe inbound event queue.
//!
//! Producers push from any thread or task without waiting on the entity.
//! The lock is held only for the push or for swapping the queue out on
//! drain, never while events are handled.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tau_types::InboundEvent;

/// FIFO queue of events waiting for an entity's next iteration.
#[derive(Debug, Default)]
pub struct Inbox {
    queue: Mutex<VecDeque<InboundEvent>>,
}

impl Inbox {
    /// Create an empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<InboundEvent>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event.
    pub fn push(&self, event: InboundEvent) {
        self.lock().push_back(event);
    }

    /// Take every queued event, oldest first, leaving the inbox empty.
    pub fn drain(&self) -> VecDeque<InboundEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
