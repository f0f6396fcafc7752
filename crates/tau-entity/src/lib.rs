//! Entity state and behavior for the tau entity runtime.
//!
//! An entity is a stateful agent holding a resonance factor, a tiered
//! memory, a concept graph, dual-meaning variables, and logs of
//! contradictions and unactualized potentials. This crate defines that
//! state and every synchronous transition on it. Driving entities
//! concurrently is the job of `tau-core`.
//!
//! # Modules
//!
//! - [`config`] -- Probabilities, capacities, and the autogenesis gate
//! - [`entity`] -- [`EntityState`] and its direct-call handlers
//! - [`reflection`] -- Per-iteration reflection, autogenesis, truth pulse
//! - [`dispatch`] -- Parsing queued events into handler calls
//! - [`transmit`] -- The outbound snapshot
//! - [`graph`] -- The thread-safe [`ConceptGraph`]
//! - [`memory`] -- [`TieredMemory`]
//! - [`lexicon`] -- Fixed vocabulary and narrative templates
//! - [`observer`] -- Signals and the [`EntityObserver`] seam
//! - [`view`] -- Rule-facing attribute paths
//! - [`error`] -- Rejections and dispatch errors

pub mod config;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod graph;
pub mod lexicon;
pub mod memory;
pub mod observer;
pub mod reflection;
pub mod transmit;
pub mod view;

pub use config::{AutogenesisGate, EntityConfig};
pub use dispatch::Command;
pub use entity::{CritiqueOutcome, DipoleCore, EntityState, RESONANCE_FLOOR};
pub use error::{DispatchError, GraphError, Rejection};
pub use graph::{ConceptAttributes, ConceptGraph, Relation};
pub use memory::TieredMemory;
pub use observer::{
    EntityObserver, NoOpObserver, Origin, Phase, RecordingObserver, Severity, Signal,
    TracingObserver,
};
