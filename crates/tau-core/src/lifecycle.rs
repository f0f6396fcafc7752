//! Entity lifecycle state machine.
//!
//! `Created -> Running -> Stopping -> Stopped`, plus `Created -> Stopped`
//! for an entity stopped before it was ever started. The phase is a single
//! atomic so `stop()` never blocks; a [`Notify`] wakes an idling loop
//! early.

use std::sync::atomic::{AtomicU8, Ordering};

use tau_entity::Phase;
use tokio::sync::Notify;

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;
const STOPPED: u8 = 3;

const fn decode(raw: u8) -> Phase {
    match raw {
        CREATED => Phase::Created,
        RUNNING => Phase::Running,
        STOPPING => Phase::Stopping,
        _ => Phase::Stopped,
    }
}

/// Shared lifecycle state of one entity.
#[derive(Debug)]
pub struct Lifecycle {
    phase: AtomicU8,
    wake: Notify,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// A lifecycle in the `Created` phase.
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(CREATED),
            wake: Notify::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        decode(self.phase.load(Ordering::Acquire))
    }

    /// Whether a stop has been requested (or completed).
    pub fn is_stop_requested(&self) -> bool {
        self.phase.load(Ordering::Acquire) >= STOPPING
    }

    /// `Created -> Running`. Returns `false` from any other phase.
    pub fn start(&self) -> bool {
        self.transition(CREATED, RUNNING)
    }

    /// Request a stop. Idempotent and non-blocking.
    ///
    /// Returns the phase entered, or `None` if a stop was already requested.
    pub fn request_stop(&self) -> Option<Phase> {
        if self.transition(RUNNING, STOPPING) {
            self.wake.notify_one();
            return Some(Phase::Stopping);
        }
        if self.transition(CREATED, STOPPED) {
            return Some(Phase::Stopped);
        }
        None
    }

    /// `Stopping -> Stopped`, called once the loop has exited.
    pub fn finish(&self) {
        self.phase.store(STOPPED, Ordering::Release);
    }

    /// Resolves once a stop has been requested. A request made while nobody
    /// is waiting is remembered, so the next call returns immediately.
    pub async fn stop_requested(&self) {
        if self.is_stop_requested() {
            return;
        }
        self.wake.notified().await;
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.phase
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_progression() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.phase(), Phase::Created);
        assert!(lifecycle.start());
        assert!(!lifecycle.start());
        assert_eq!(lifecycle.phase(), Phase::Running);

        assert_eq!(lifecycle.request_stop(), Some(Phase::Stopping));
        assert!(lifecycle.is_stop_requested());
        assert_eq!(lifecycle.request_stop(), None);

        lifecycle.finish();
        assert_eq!(lifecycle.phase(), Phase::Stopped);
        assert_eq!(lifecycle.request_stop(), None);
    }

    #[test]
    fn stop_before_start_goes_straight_to_stopped() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.request_stop(), Some(Phase::Stopped));
        assert!(!lifecycle.start());
    }

    #[tokio::test]
    async fn pending_stop_wakes_waiter() {
        let lifecycle = Lifecycle::new();
        lifecycle.start();
        lifecycle.request_stop();
        lifecycle.stop_requested().await;
        assert!(lifecycle.is_stop_requested());
    }
}
