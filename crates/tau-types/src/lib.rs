//! Shared type definitions for the tau entity runtime.
//!
//! This crate is the single source of truth for the records that flow
//! between the entity state, the rule engine, the runtime driver, and the
//! orchestrator binary. It contains no behavior beyond constructors and
//! small accessors.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers around [`uuid::Uuid`]
//! - [`records`] -- Memory records, variables, contradictions, shadow traces
//! - [`events`] -- The inbound event envelope accepted by an entity's queue
//! - [`transmission`] -- The outbound structured snapshot produced by `transmit`

pub mod events;
pub mod ids;
pub mod records;
pub mod transmission;

pub use events::InboundEvent;
pub use ids::EntityId;
pub use records::{ChildRef, Contradiction, MemoryRecord, ShadowTrace, Stamped, Variable};
pub use transmission::{CodeSignature, MemoryTrace, SoulEssence, Transmission};
