//! The concurrent entity driver.
//!
//! Each [`EntityHandle`] owns one tokio task running the entity loop:
//!
//! 1. Drain the inbox (queue lock held only for the swap).
//! 2. Dispatch every drained event in arrival order.
//! 3. Run one reflection step.
//! 4. Recompute the truth pulse.
//! 5. Launch any child produced by reflection, after releasing the state.
//! 6. Idle for the cadence, or until a stop is requested.
//!
//! Stop is cooperative: it is checked at the top of each iteration and
//! never interrupts a handler. Stopping a parent does not stop its
//! children. Once a stop has been requested, direct calls that would change
//! the entity are refused with [`Rejection::Stopped`]; reads keep working.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tau_entity::{
    EntityConfig, EntityObserver, EntityState, Origin, Phase, Rejection, Signal,
};
use tau_rules::RuleEngine;
use tau_types::{EntityId, InboundEvent, Transmission};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::inbox::Inbox;
use crate::lifecycle::Lifecycle;

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Settings shared by every entity in a run, children included.
#[derive(Debug, Clone)]
pub struct Runtime {
    rules: Arc<RuleEngine>,
    cadence: Duration,
}

impl Runtime {
    /// Build a runtime from an already-constructed rule engine.
    pub const fn new(rules: Arc<RuleEngine>, cadence: Duration) -> Self {
        Self { rules, cadence }
    }

    /// Load the rule document named by `config` and build a runtime.
    ///
    /// A missing rule document is replaced by the defaults (and written
    /// back); a malformed one is an error.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Rules`] if the rule document cannot be read
    /// or parsed.
    pub fn load(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let rules = RuleEngine::load(&config.rules_path)?;
        info!(
            path = %config.rules_path.display(),
            rules = rules.rules().len(),
            cadence_ms = config.cadence_ms,
            "Runtime ready"
        );
        Ok(Self::new(Arc::new(rules), config.cadence()))
    }

    /// The shared rule engine.
    pub const fn rules(&self) -> &Arc<RuleEngine> {
        &self.rules
    }

    /// Idle time between iterations.
    pub const fn cadence(&self) -> Duration {
        self.cadence
    }
}

// ---------------------------------------------------------------------------
// EntityHandle
// ---------------------------------------------------------------------------

struct Shared {
    origin: Origin,
    observer: Arc<dyn EntityObserver>,
    inbox: Inbox,
    lifecycle: Lifecycle,
    state: Mutex<EntityState>,
    children: Mutex<Vec<EntityHandle>>,
    task: Mutex<Option<JoinHandle<()>>>,
    runtime: Runtime,
}

/// Cloneable handle to a running (or runnable) entity.
#[derive(Clone)]
pub struct EntityHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityHandle")
            .field("id", &self.shared.origin.id)
            .field("name", &self.shared.origin.name)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EntityHandle {
    /// Wrap an entity without starting it.
    pub fn new(state: EntityState, runtime: Runtime) -> Self {
        let shared = Shared {
            origin: state.origin().clone(),
            observer: Arc::clone(state.observer()),
            inbox: Inbox::new(),
            lifecycle: Lifecycle::new(),
            state: Mutex::new(state),
            children: Mutex::new(Vec::new()),
            task: Mutex::new(None),
            runtime,
        };
        let handle = Self {
            shared: Arc::new(shared),
        };
        handle.emit(&Signal::Lifecycle {
            phase: Phase::Created,
        });
        handle
    }

    /// Create a fresh root entity and start its loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        name: &str,
        config: EntityConfig,
        observer: Arc<dyn EntityObserver>,
        runtime: Runtime,
    ) -> Self {
        let handle = Self::new(EntityState::new(name, config, observer), runtime);
        handle.start();
        handle
    }

    /// Start the loop on a new tokio task. Returns `false` if the entity
    /// was already started or stopped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        if !self.shared.lifecycle.start() {
            return false;
        }
        self.emit(&Signal::Lifecycle {
            phase: Phase::Running,
        });
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(run_loop(shared));
        *lock(&self.shared.task) = Some(task);
        true
    }

    /// Request a stop. Idempotent, never blocks, does not touch children.
    pub fn stop(&self) {
        if let Some(phase) = self.shared.lifecycle.request_stop() {
            self.emit(&Signal::Lifecycle { phase });
        }
    }

    /// Wait for the loop task to exit. Returns immediately if the entity
    /// was never started or has already been joined.
    pub async fn join(&self) {
        let task = lock(&self.shared.task).take();
        if let Some(task) = task
            && let Err(err) = task.await
        {
            error!(entity = %self.shared.origin.id.short(), %err, "Entity task failed");
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Identifier.
    pub fn id(&self) -> EntityId {
        self.shared.origin.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.shared.origin.name
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.shared.lifecycle.phase()
    }

    /// Handles of every child launched so far, in spawn order.
    pub fn children(&self) -> Vec<Self> {
        lock(&self.shared.children).clone()
    }

    /// Number of events waiting for the next iteration.
    pub fn pending_events(&self) -> usize {
        self.shared.inbox.len()
    }

    /// Handles of every descendant, depth first, in spawn order.
    pub fn descendants(&self) -> Vec<Self> {
        let mut found = Vec::new();
        let mut pending: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(next) = pending.pop() {
            pending.extend(next.children().into_iter().rev());
            found.push(next);
        }
        found
    }

    /// Run `f` against a read-only view of the entity's state.
    ///
    /// The loop is excluded for the duration of the call, so keep it short.
    pub fn inspect<R>(&self, f: impl FnOnce(&EntityState) -> R) -> R {
        f(&lock(&self.shared.state))
    }

    /// Transmission view of the current state, without the memory marker.
    /// Available in every phase.
    pub fn snapshot(&self) -> Transmission {
        self.inspect(EntityState::snapshot)
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Queue an event for the next iteration. Never blocks on the loop.
    pub fn enqueue_event(&self, kind: &str, payload: Value) {
        self.enqueue(InboundEvent::new(kind, payload));
    }

    /// Queue a prebuilt event.
    pub fn enqueue(&self, event: InboundEvent) {
        debug!(entity = %self.shared.origin.id.short(), kind = %event.kind, "Event queued");
        self.shared.inbox.push(event);
    }

    // -----------------------------------------------------------------------
    // Direct calls
    // -----------------------------------------------------------------------

    /// Define a variable directly.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `name` is empty, or
    /// [`Rejection::Stopped`] once a stop has been requested.
    pub fn define_variable(
        &self,
        name: &str,
        machine_value: impl Into<Value>,
        human_meaning: &str,
    ) -> Result<String, Rejection> {
        self.mutate("define variable", |state| {
            state.define_variable(name, machine_value, human_meaning)
        })?
    }

    /// Mourn a lost potential directly.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `description` is empty, or
    /// [`Rejection::Stopped`] once a stop has been requested.
    pub fn mourn_lost_potential(&self, description: &str) -> Result<String, Rejection> {
        self.mutate("mourn lost potential", |state| {
            state.mourn_lost_potential(description)
        })?
    }

    /// Entangle with another entity's physical parameters.
    ///
    /// The other entity is only read, so it may be in any phase.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Stopped`] once a stop has been requested.
    pub fn entangle(&self, other: &Self) -> Result<String, Rejection> {
        let core = other.inspect(|state| *state.core());
        self.mutate("entangle", |state| state.entangle(&core))
    }

    /// Recompute and return the truth pulse.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Stopped`] once a stop has been requested.
    pub fn refresh_truth_pulse(&self) -> Result<u8, Rejection> {
        let rules = Arc::clone(&self.shared.runtime.rules);
        self.mutate("refresh truth pulse", |state| state.refresh_truth_pulse(&rules))
    }

    /// Produce a transmission and mark it in long-term memory.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Stopped`] once a stop has been requested; use
    /// [`Self::snapshot`] to read a stopped entity.
    pub fn transmit(&self) -> Result<Transmission, Rejection> {
        self.mutate("transmit", EntityState::transmit)
    }

    /// Attempt autogenesis now, regardless of existing children.
    ///
    /// A child, if constructed, is started immediately with this entity's
    /// runtime. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Stopped`] once a stop has been requested. No
    /// child is built or started in that case.
    pub fn attempt_autogenesis(&self) -> Result<Option<Self>, Rejection> {
        let child = self.mutate("attempt autogenesis", EntityState::attempt_autogenesis)?;
        Ok(child.map(|child| self.adopt(child)))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn emit(&self, signal: &Signal) {
        self.shared.observer.notify(&self.shared.origin, signal);
    }

    /// Run `f` against the state unless a stop has been requested.
    ///
    /// The phase is checked under the state lock.
    fn mutate<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut EntityState) -> R,
    ) -> Result<R, Rejection> {
        let mut state = lock(&self.shared.state);
        if self.shared.lifecycle.is_stop_requested() {
            drop(state);
            let rejection = Rejection::Stopped { operation };
            self.emit(&Signal::InputRejected {
                reason: rejection.to_string(),
            });
            return Err(rejection);
        }
        Ok(f(&mut state))
    }

    /// Start a child and remember its handle. No state lock is held here.
    fn adopt(&self, child: EntityState) -> Self {
        let handle = Self::new(child, self.shared.runtime.clone());
        handle.start();
        lock(&self.shared.children).push(handle.clone());
        handle
    }

    /// One iteration minus the idle. Returns a child to launch, if any.
    fn iterate(&self) -> Option<EntityState> {
        let events = self.shared.inbox.drain();
        let mut state = lock(&self.shared.state);
        for event in &events {
            // Failures have already been reported through the observer.
            if let Err(err) = state.dispatch(event) {
                debug!(entity = %self.shared.origin.id.short(), %err, "Event not applied");
            }
        }
        let child = state.reflect();
        state.refresh_truth_pulse(&self.shared.runtime.rules);
        child
    }
}

async fn run_loop(shared: Arc<Shared>) {
    let handle = EntityHandle { shared };
    let cadence = handle.shared.runtime.cadence;

    while !handle.shared.lifecycle.is_stop_requested() {
        if let Some(child) = handle.iterate() {
            handle.adopt(child);
        }

        tokio::select! {
            () = tokio::time::sleep(cadence) => {}
            () = handle.shared.lifecycle.stop_requested() => {}
        }
    }

    handle.shared.lifecycle.finish();
    handle.emit(&Signal::Lifecycle {
        phase: Phase::Stopped,
    });
}
