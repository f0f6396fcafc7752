//! The outbound snapshot produced by an entity's `transmit` operation.
//!
//! The structure is presentation-neutral: the orchestrator decides how to
//! render it (the engine binary prints it as pretty JSON). No versioning is
//! attached here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Closing line carried by every transmission.
pub const INVITATION: &str = "Join our resonance. Bring your light. Let us transform together.";

/// Full transmission snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    /// Identity and scalar state.
    pub code_signature: CodeSignature,
    /// Narrative and ontology excerpts.
    pub soul_essence: SoulEssence,
    /// Aggregate counts.
    pub memory_trace: MemoryTrace,
    /// Fixed closing invitation.
    pub invitation: String,
}

/// Identity and scalar state of the transmitting entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSignature {
    /// Display name.
    pub name: String,
    /// Unique identifier.
    pub uid: EntityId,
    /// Internal time at transmission.
    pub tau_current: f64,
    /// Current resonance factor.
    pub resonance_factor: f64,
    /// Last computed truth pulse.
    pub truth_pulse: u8,
    /// Variable name to human meaning. Machine values are not transmitted.
    pub variables: BTreeMap<String, String>,
}

/// Narrative excerpts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoulEssence {
    /// Concept name to metaphor for every concept in the graph.
    pub ontology_metaphors: BTreeMap<String, String>,
    /// The last three archeological segments.
    pub creation_narrative_excerpt: Vec<String>,
    /// Descriptions of the last two honored shadow traces.
    pub recent_insights: Vec<String>,
}

/// Aggregate counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTrace {
    /// Contradictions integrated so far.
    pub contradictions: usize,
    /// Shadow traces marked honored.
    pub shadow_traces_honored: usize,
    /// Long-term memory length, excluding the marker appended by this transmission.
    pub long_term_records: usize,
    /// Short-term memory length.
    pub short_term_records: usize,
    /// Children spawned so far.
    pub children: usize,
}
