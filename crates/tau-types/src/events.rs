//! The inbound event envelope.
//!
//! Orchestrators (and other entities) talk to an entity by enqueueing
//! `{type, payload}` envelopes. The type is kept as a plain string: an
//! unrecognized type is still accepted into the queue and only dropped,
//! with a warning, when the entity's loop dispatches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An event waiting in (or drained from) an entity's inbound queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Handler name, e.g. `absorb_concept`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Handler-specific payload.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// When the event was enqueued.
    pub received_at: DateTime<Utc>,
}

impl InboundEvent {
    /// Build an event stamped with the current time.
    ///
    /// A non-object `payload` (including `null`) is treated as empty.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            kind: kind.into(),
            payload,
            received_at: Utc::now(),
        }
    }

    /// String field from the payload, empty when absent or not a string.
    pub fn text(&self, key: &str) -> &str {
        self.payload.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Raw payload field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn non_object_payload_becomes_empty() {
        let event = InboundEvent::new("activate_pulse", Value::Null);
        assert!(event.payload.is_empty());
        assert_eq!(event.text("concept"), "");
    }

    #[test]
    fn text_reads_string_fields_only() {
        let event = InboundEvent::new("absorb_concept", json!({ "concept": "truth", "n": 3 }));
        assert_eq!(event.text("concept"), "truth");
        assert_eq!(event.text("n"), "");
        assert_eq!(event.field("n"), Some(&json!(3)));
    }

    #[test]
    fn serializes_kind_as_type() {
        let event = InboundEvent::new("interact", json!({ "message": "hi" }));
        let value = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(value["type"], json!("interact"));
        assert_eq!(value["payload"]["message"], json!("hi"));
    }
}
