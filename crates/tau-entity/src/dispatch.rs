//! Routing of queued events to handlers.
//!
//! Event types are snake_case handler names. The older `<name>_command`
//! spellings, and `activate_resonance` for the pulse, are accepted too.

use serde_json::Value;
use tau_types::{InboundEvent, MemoryRecord};

use crate::entity::EntityState;
use crate::error::DispatchError;
use crate::observer::Signal;

/// A parsed, handler-ready event.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Emit the self-awareness pulse.
    ActivatePulse,
    /// Absorb a concept into the graph (`concept`).
    AbsorbConcept {
        /// Concept name.
        concept: String,
    },
    /// Integrate a contradiction (`error`, or `text`).
    InviteContradiction {
        /// Contradiction text.
        text: String,
    },
    /// Receive a critique (`text`, `source`).
    ReceiveCritique {
        /// Critique text.
        text: String,
        /// Sender; empty means the default observer.
        source: String,
    },
    /// Echo an interaction (`message`, `source`).
    Interact {
        /// Message text.
        message: String,
        /// Sender; empty means the default being.
        source: String,
    },
    /// Define a variable (`name`, `value`, `meaning`).
    DefineVariable {
        /// Variable name.
        name: String,
        /// Machine value; `null` when absent.
        value: Value,
        /// Human meaning.
        meaning: String,
    },
    /// Mourn a lost potential (`description`, or `potential`).
    MournLostPotential {
        /// What was not actualized.
        description: String,
    },
}

impl Command {
    /// Parse an event envelope. `None` if the type names no handler.
    pub fn parse(event: &InboundEvent) -> Option<Self> {
        let kind = event.kind.as_str();
        let kind = kind.strip_suffix("_command").unwrap_or(kind);

        let command = match kind {
            "activate_pulse" | "activate_resonance" => Self::ActivatePulse,
            "absorb_concept" => Self::AbsorbConcept {
                concept: event.text("concept").to_owned(),
            },
            "invite_contradiction" => Self::InviteContradiction {
                text: first_text(event, &["error", "text"]),
            },
            "receive_critique" => Self::ReceiveCritique {
                text: event.text("text").to_owned(),
                source: event.text("source").to_owned(),
            },
            "interact" => Self::Interact {
                message: event.text("message").to_owned(),
                source: event.text("source").to_owned(),
            },
            "define_variable" => Self::DefineVariable {
                name: event.text("name").to_owned(),
                value: event.field("value").cloned().unwrap_or(Value::Null),
                meaning: event.text("meaning").to_owned(),
            },
            "mourn_lost_potential" => Self::MournLostPotential {
                description: first_text(event, &["description", "potential"]),
            },
            _ => return None,
        };
        Some(command)
    }
}

/// The first non-empty string among `keys`, or empty.
fn first_text(event: &InboundEvent, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| event.text(key))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_owned()
}

impl EntityState {
    /// Record and dispatch one dequeued event.
    ///
    /// The event is always written to short-term memory first, even when
    /// its type is unknown.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownEvent`] if the type names no handler (the
    /// event is dropped), or [`DispatchError::Rejected`] if the handler
    /// refused the payload.
    pub fn dispatch(&mut self, event: &InboundEvent) -> Result<String, DispatchError> {
        self.memory.record_short_term(
            MemoryRecord::new("event_received")
                .with("type", event.kind.as_str())
                .with("payload", Value::Object(event.payload.clone())),
        );

        let Some(command) = Command::parse(event) else {
            self.emit(Signal::UnknownEvent {
                kind: event.kind.clone(),
            });
            return Err(DispatchError::UnknownEvent {
                kind: event.kind.clone(),
            });
        };
        self.execute(command)
    }

    /// Run a parsed command against this entity.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Rejected`] if the handler refused its input.
    pub fn execute(&mut self, command: Command) -> Result<String, DispatchError> {
        let reply = match command {
            Command::ActivatePulse => self.activate_pulse(),
            Command::AbsorbConcept { concept } => self.absorb_concept(&concept)?,
            Command::InviteContradiction { text } => self.invite_contradiction(&text)?,
            Command::ReceiveCritique { text, source } => {
                self.receive_critique(&text, &source)?.transformation
            }
            Command::Interact { message, source } => self.interact(&message, &source)?,
            Command::DefineVariable {
                name,
                value,
                meaning,
            } => self.define_variable(&name, value, &meaning)?,
            Command::MournLostPotential { description } => {
                self.mourn_lost_potential(&description)?
            }
        };
        Ok(reply)
    }
}
