//! Records kept by an entity: memory entries, dual-meaning variables,
//! integrated contradictions, shadow traces, and child references.
//!
//! `tau` values throughout are the entity's internal time: wall-clock
//! seconds since the Unix epoch, with sub-second precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::EntityId;

// ---------------------------------------------------------------------------
// Memory records
// ---------------------------------------------------------------------------

/// A structured memory entry.
///
/// Every record carries an `action` label. The label is descriptive only:
/// rules never look inside memory records, they only count them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Short label for what happened (e.g. `concept_absorption`).
    pub action: String,
    /// Free-form structured details.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl MemoryRecord {
    /// Create a record with the given action and no details.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            details: Map::new(),
        }
    }

    /// Attach a detail field, builder style.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(String::from(key), value.into());
        self
    }

    /// Look up a detail field.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

/// A value paired with the wall-clock instant it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    /// When the value was recorded.
    pub at: DateTime<Utc>,
    /// The recorded value.
    pub record: T,
}

impl<T> Stamped<T> {
    /// Stamp a value with the current time.
    pub fn now(record: T) -> Self {
        Self {
            at: Utc::now(),
            record,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity bookkeeping
// ---------------------------------------------------------------------------

/// A dual-meaning variable: a machine value and its human meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// The machine-readable value.
    pub machine_value: Value,
    /// The human-meaningful ("soul") interpretation.
    pub human_meaning: String,
    /// Internal time at which this definition was made.
    pub defined_at: f64,
}

/// A contradiction integrated by an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    /// The contradiction text as supplied.
    pub error_text: String,
    /// Internal time at integration.
    pub tau: f64,
    /// Resonance factor immediately before the adjustment.
    pub resonance_before: f64,
}

/// A logged unactualized possibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowTrace {
    /// What was not actualized.
    pub description: String,
    /// Internal time at which it was mourned.
    pub tau: f64,
    /// Decided once by a fair coin flip at creation; never changes.
    pub honored: bool,
}

/// Reference to a child spawned through autogenesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    /// The child's identifier.
    pub id: EntityId,
    /// The child's display name.
    pub name: String,
}
