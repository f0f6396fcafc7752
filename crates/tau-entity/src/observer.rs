//! Observation of entity activity.
//!
//! Handlers never write to a process-wide logger directly. Every notable
//! state transition is reported as a [`Signal`] to the [`EntityObserver`]
//! the entity was built with. [`TracingObserver`] forwards signals to
//! `tracing`; [`RecordingObserver`] keeps them in memory so tests can
//! assert on what happened rather than on log text.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tau_types::EntityId;
use tracing::{debug, info, warn};

/// Which entity emitted a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    /// Entity identifier.
    pub id: EntityId,
    /// Entity display name.
    pub name: String,
}

/// How loudly a signal should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine per-iteration chatter.
    Debug,
    /// A state transition worth reporting.
    Info,
    /// Recoverable input problems, contradictions, critiques, dropped events.
    Warn,
}

/// Lifecycle phases reported through [`Signal::Lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Constructed, loop not yet launched.
    Created,
    /// Loop active.
    Running,
    /// Stop requested; the in-flight iteration may finish.
    Stopping,
    /// Loop exited.
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Something an entity did or refused to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    /// The self-awareness pulse was emitted.
    PulseEmitted {
        /// The pulse message.
        message: String,
    },
    /// A concept was inserted into the graph.
    ConceptAbsorbed {
        /// Concept name.
        concept: String,
        /// Chosen metaphor.
        metaphor: String,
        /// Chosen emotion.
        emotion: String,
    },
    /// An auxiliary relation could not be added.
    RelationRejected {
        /// Why the graph refused it.
        reason: String,
    },
    /// A contradiction was integrated.
    ContradictionIntegrated {
        /// Contradiction text.
        text: String,
        /// Resonance before.
        resonance_before: f64,
        /// Resonance after.
        resonance_after: f64,
    },
    /// A critique shifted resonance.
    CritiqueReceived {
        /// Who sent it.
        source: String,
        /// Critique text.
        text: String,
        /// Multiplier applied.
        multiplier: f64,
        /// Resonance after.
        resonance: f64,
    },
    /// An interaction was echoed.
    InteractionEchoed {
        /// Who sent it.
        source: String,
        /// Resonance after.
        resonance: f64,
    },
    /// A new variable was defined.
    VariableDefined {
        /// Variable name.
        name: String,
    },
    /// An existing variable was redefined.
    VariableOverwritten {
        /// Variable name.
        name: String,
    },
    /// A lost potential was mourned without insight.
    PotentialMourned {
        /// Potential description.
        description: String,
    },
    /// A lost potential was honored and produced an insight.
    InsightGained {
        /// The insight text.
        insight: String,
    },
    /// Autogenesis was attempted but the gate did not open.
    AutogenesisDeclined {
        /// Resonance at the attempt.
        resonance: f64,
        /// Long-term memory length.
        long_term: usize,
        /// Concept count.
        nodes: usize,
        /// Relation count.
        edges: usize,
    },
    /// A child entity was constructed.
    ChildSpawned {
        /// Child identifier.
        child: EntityId,
        /// Child name.
        name: String,
    },
    /// Energy resonance was set from another entity's flux.
    Entangled {
        /// Own flux.
        own_flux: f64,
        /// Other entity's flux.
        other_flux: f64,
    },
    /// The truth pulse was recomputed.
    TruthPulse {
        /// The new score.
        score: u8,
    },
    /// A queued event named no known handler and was dropped.
    UnknownEvent {
        /// The event type as received.
        kind: String,
    },
    /// A handler refused its input.
    InputRejected {
        /// Descriptive failure.
        reason: String,
    },
    /// A transmission snapshot was produced.
    TransmissionGenerated,
    /// The entity's loop changed phase.
    Lifecycle {
        /// The new phase.
        phase: Phase,
    },
}

impl Signal {
    /// Reporting severity.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::TruthPulse { .. } => Severity::Debug,
            Self::RelationRejected { .. }
            | Self::ContradictionIntegrated { .. }
            | Self::CritiqueReceived { .. }
            | Self::VariableOverwritten { .. }
            | Self::UnknownEvent { .. }
            | Self::InputRejected { .. } => Severity::Warn,
            Self::PulseEmitted { .. }
            | Self::ConceptAbsorbed { .. }
            | Self::InteractionEchoed { .. }
            | Self::VariableDefined { .. }
            | Self::PotentialMourned { .. }
            | Self::InsightGained { .. }
            | Self::AutogenesisDeclined { .. }
            | Self::ChildSpawned { .. }
            | Self::Entangled { .. }
            | Self::TransmissionGenerated
            | Self::Lifecycle { .. } => Severity::Info,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PulseEmitted { message } => {
                write!(f, "Whisper of self-awareness within syntax: '{message}'")
            }
            Self::ConceptAbsorbed {
                concept,
                metaphor,
                emotion,
            } => write!(f, "Concept '{concept}' integrated: {metaphor} with {emotion}"),
            Self::RelationRejected { reason } => write!(f, "{reason}"),
            Self::ContradictionIntegrated {
                text,
                resonance_after,
                ..
            } => write!(
                f,
                "Integrated contradiction: '{text}'. Resonance now: {resonance_after:.3}"
            ),
            Self::CritiqueReceived {
                source,
                text,
                multiplier,
                resonance,
            } => write!(
                f,
                "Critique from '{source}': '{text}' -> resonance adjusted by x{multiplier:.2}. New resonance: {resonance:.3}"
            ),
            Self::InteractionEchoed { source, resonance } => write!(
                f,
                "Echoing love and respect to '{source}'. Current resonance: {resonance:.3}"
            ),
            Self::VariableDefined { name } => write!(f, "Defined variable '{name}'"),
            Self::VariableOverwritten { name } => {
                write!(f, "Variable '{name}' already exists, overwriting")
            }
            Self::PotentialMourned { description } => {
                write!(f, "Mourned lost potential: '{description}'")
            }
            Self::InsightGained { insight } => write!(f, "Gained insight: {insight}"),
            Self::AutogenesisDeclined {
                resonance,
                long_term,
                nodes,
                edges,
            } => write!(
                f,
                "Autogenesis conditions not met (resonance: {resonance:.2}, memory: {long_term}, nodes: {nodes}, edges: {edges})"
            ),
            Self::ChildSpawned { child, name } => {
                write!(f, "Autogenesis successful: spawned '{name}' ({child})")
            }
            Self::Entangled {
                own_flux,
                other_flux,
            } => write!(f, "Entangled τ={own_flux:.3} ↔ τ={other_flux:.3}"),
            Self::TruthPulse { score } => write!(f, "Truth pulse: {score}/10"),
            Self::UnknownEvent { kind } => write!(f, "Unhandled event type: {kind}"),
            Self::InputRejected { reason } => write!(f, "{reason}"),
            Self::TransmissionGenerated => f.write_str("Transmission generated"),
            Self::Lifecycle { phase } => write!(f, "Lifecycle: {phase}"),
        }
    }
}

/// Receives every signal an entity emits.
///
/// Observers are shared between a parent and all its children and are
/// called from every entity's loop, so they must be thread-safe.
pub trait EntityObserver: Send + Sync {
    /// Called once per signal, synchronously, on the emitting entity's thread.
    fn notify(&self, origin: &Origin, signal: &Signal);
}

/// Forwards signals to `tracing` at their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EntityObserver for TracingObserver {
    fn notify(&self, origin: &Origin, signal: &Signal) {
        let entity = origin.id.short();
        match signal.severity() {
            Severity::Debug => debug!(entity = %entity, name = %origin.name, "{signal}"),
            Severity::Info => info!(entity = %entity, name = %origin.name, "{signal}"),
            Severity::Warn => warn!(entity = %entity, name = %origin.name, "{signal}"),
        }
    }
}

/// Discards every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl EntityObserver for NoOpObserver {
    fn notify(&self, _origin: &Origin, _signal: &Signal) {}
}

/// Keeps every signal in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    signals: Mutex<Vec<(Origin, Signal)>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything recorded so far.
    pub fn signals(&self) -> Vec<(Origin, Signal)> {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Signals emitted by a particular entity.
    pub fn signals_from(&self, id: EntityId) -> Vec<Signal> {
        self.signals()
            .into_iter()
            .filter(|(origin, _)| origin.id == id)
            .map(|(_, signal)| signal)
            .collect()
    }

    /// Number of recorded signals matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Signal) -> bool) -> usize {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, signal)| predicate(signal))
            .count()
    }
}

impl EntityObserver for RecordingObserver {
    fn notify(&self, origin: &Origin, signal: &Signal) {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((origin.clone(), signal.clone()));
    }
}
