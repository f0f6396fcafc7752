//! Error types for entity operations.
//!
//! None of these abort an entity's loop. Handlers return them to direct
//! callers as descriptive failures; the loop absorbs them after emitting a
//! warning signal.

/// A handler invocation was refused and did nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// A required text field was empty.
    #[error("failed to {operation}: {field} is empty")]
    EmptyInput {
        /// The operation that was refused, e.g. `absorb concept`.
        operation: &'static str,
        /// The empty field, e.g. `name`.
        field: &'static str,
    },

    /// The entity has been asked to stop and no longer accepts changes.
    #[error("failed to {operation}: entity has stopped")]
    Stopped {
        /// The operation that was refused, e.g. `define variable`.
        operation: &'static str,
    },
}

/// Concept graph mutations that were refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A relation endpoint is not a known concept.
    #[error("relation {from} --{relation}--> {to} rejected: concept '{missing}' is missing")]
    MissingConcept {
        /// Source concept.
        from: String,
        /// Relation label.
        relation: String,
        /// Target concept.
        to: String,
        /// The first endpoint found missing.
        missing: String,
    },
}

/// Failures while dispatching a queued event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The event type names no known handler.
    #[error("unhandled event type: {kind}")]
    UnknownEvent {
        /// The event type as received.
        kind: String,
    },

    /// The handler refused the payload.
    #[error(transparent)]
    Rejected(#[from] Rejection),
}
