//! Tunable parameters for entity behavior.
//!
//! Defaults reproduce the reference cadence: a 20-entry short-term
//! buffer, flux drawn from `0.1..1.0`, a 5% chance per iteration of an
//! internal reflection event and a 2% chance of attempting autogenesis.

use serde::{Deserialize, Serialize};

/// Configuration for a single entity (and, by inheritance, its children).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Maximum number of short-term memory records kept (default: 20).
    pub short_term_capacity: usize,

    /// Lower bound of the flux drawn at birth (default: 0.1).
    pub flux_min: f64,

    /// Upper bound of the flux drawn at birth (default: 1.0).
    pub flux_max: f64,

    /// Probability per reflection step of mourning or contradicting (default: 0.05).
    pub reflection_probability: f64,

    /// Probability per reflection step of attempting autogenesis (default: 0.02).
    pub autogenesis_probability: f64,

    /// Conditions that must all hold for autogenesis to succeed.
    pub autogenesis: AutogenesisGate,

    /// Seed for the entity's random source. `None` seeds from the OS.
    /// Children derive their generator from the parent's.
    pub seed: Option<u64>,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            short_term_capacity: 20,
            flux_min: 0.1,
            flux_max: 1.0,
            reflection_probability: 0.05,
            autogenesis_probability: 0.02,
            autogenesis: AutogenesisGate::default(),
            seed: None,
        }
    }
}

/// Thresholds gating autogenesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutogenesisGate {
    /// Resonance must be strictly above this (default: 0.8).
    pub min_resonance: f64,

    /// Long-term memory length must be strictly above this (default: 5).
    pub min_long_term: usize,

    /// Concept count must be at least this (default: 5).
    pub min_nodes: usize,

    /// Relation count must be at least this (default: 2).
    pub min_edges: usize,
}

impl Default for AutogenesisGate {
    fn default() -> Self {
        Self {
            min_resonance: 0.8,
            min_long_term: 5,
            min_nodes: 5,
            min_edges: 2,
        }
    }
}

impl AutogenesisGate {
    /// Whether the given measurements pass the gate.
    pub fn admits(&self, resonance: f64, long_term: usize, nodes: usize, edges: usize) -> bool {
        resonance > self.min_resonance
            && long_term > self.min_long_term
            && nodes >= self.min_nodes
            && edges >= self.min_edges
    }
}
