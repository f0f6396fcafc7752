//! Entity state and its direct-call handlers.
//!
//! [`EntityState`] is plain data plus behavior: it owns its memory, its
//! variables, its contradiction and shadow logs, and a handle to a
//! (possibly shared) [`ConceptGraph`]. Every handler is a synchronous state
//! transition, so the whole entity is testable without spinning up a loop.
//! The concurrent driver lives in `tau-core`.
//!
//! Resonance is floor-protected: no mutation can leave it below
//! [`RESONANCE_FLOOR`].

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{Value, json};
use tau_types::{ChildRef, Contradiction, EntityId, MemoryRecord, ShadowTrace, Variable};

use crate::config::EntityConfig;
use crate::error::Rejection;
use crate::graph::{ConceptAttributes, ConceptGraph};
use crate::lexicon;
use crate::memory::TieredMemory;
use crate::observer::{EntityObserver, Origin, Signal};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest resonance an entity can ever have.
pub const RESONANCE_FLOOR: f64 = 0.01;

/// Resonance of a freshly created entity.
pub const INITIAL_RESONANCE: f64 = 1.0;

/// The fixed mass echo (golden ratio).
pub const MASS_ECHO: f64 = 1.618_033_988_7;

/// Multiplier range applied by a contradiction.
const CONTRADICTION_RANGE: (f64, f64) = (0.8, 0.95);

/// Multiplier range applied by a critique.
const CRITIQUE_RANGE: (f64, f64) = (0.7, 1.3);

/// Multiplier range applied by a positive interaction.
const INTERACTION_RANGE: (f64, f64) = (1.02, 1.08);

/// Default critique source when none is given.
pub const DEFAULT_CRITIQUE_SOURCE: &str = "External Observer";

/// Default interaction source when none is given.
pub const DEFAULT_INTERACTION_SOURCE: &str = "External Being";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current wall-clock time as fractional seconds since the epoch.
#[allow(clippy::cast_precision_loss)]
pub fn now_tau() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Uniform sample from `low..high`; `low` when the range is empty.
pub(crate) fn uniform(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    if low < high {
        rng.random_range(low..high)
    } else {
        low
    }
}

/// `true` with probability `p` (never for `p <= 0`, always for `p >= 1`).
pub(crate) fn chance(rng: &mut StdRng, p: f64) -> bool {
    rng.random::<f64>() < p
}

// ---------------------------------------------------------------------------
// Physical parameters
// ---------------------------------------------------------------------------

/// The entity's physical parameter triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DipoleCore {
    /// Drawn once at birth, immutable.
    pub flux: f64,
    /// Always [`MASS_ECHO`].
    pub mass_echo: f64,
    /// Set only by entanglement.
    pub energy_resonance: f64,
}

// ---------------------------------------------------------------------------
// Handler outcomes
// ---------------------------------------------------------------------------

/// Narrative entry produced by a critique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueOutcome {
    /// Critique text.
    pub critique: String,
    /// Who sent it.
    pub source: String,
    /// Internal time of receipt.
    pub tau: f64,
    /// Multiplier applied to resonance.
    pub resonance_shift: f64,
    /// Fixed transformation narrative.
    pub transformation: String,
}

// ---------------------------------------------------------------------------
// EntityState
// ---------------------------------------------------------------------------

/// All mutable state of one entity.
pub struct EntityState {
    pub(crate) origin: Origin,
    pub(crate) internal_time: f64,
    pub(crate) core: DipoleCore,
    pub(crate) resonance: f64,
    pub(crate) graph: Arc<ConceptGraph>,
    pub(crate) memory: TieredMemory,
    pub(crate) variables: BTreeMap<String, Variable>,
    pub(crate) contradictions: Vec<Contradiction>,
    pub(crate) shadow_traces: Vec<ShadowTrace>,
    pub(crate) children: Vec<ChildRef>,
    pub(crate) truth_pulse: u8,
    pub(crate) config: EntityConfig,
    pub(crate) rng: StdRng,
    pub(crate) observer: Arc<dyn EntityObserver>,
}

impl fmt::Debug for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityState")
            .field("origin", &self.origin)
            .field("internal_time", &self.internal_time)
            .field("core", &self.core)
            .field("resonance", &self.resonance)
            .field("variables", &self.variables.len())
            .field("contradictions", &self.contradictions.len())
            .field("shadow_traces", &self.shadow_traces.len())
            .field("children", &self.children)
            .field("truth_pulse", &self.truth_pulse)
            .finish_non_exhaustive()
    }
}

impl EntityState {
    /// Create a new entity with a fresh identity and its own concept graph.
    pub fn new(name: &str, config: EntityConfig, observer: Arc<dyn EntityObserver>) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::assemble(
            Origin {
                id: EntityId::new(),
                name: String::from(name),
            },
            config,
            observer,
            rng,
            Arc::new(ConceptGraph::new()),
            now_tau(),
        )
    }

    /// Build an entity from its parts and seed its origin story.
    pub(crate) fn assemble(
        origin: Origin,
        config: EntityConfig,
        observer: Arc<dyn EntityObserver>,
        mut rng: StdRng,
        graph: Arc<ConceptGraph>,
        internal_time: f64,
    ) -> Self {
        let flux = uniform(&mut rng, config.flux_min, config.flux_max);
        let mut memory = TieredMemory::with_capacity(config.short_term_capacity);
        memory.extend_archeological(lexicon::origin_story(internal_time));

        Self {
            origin,
            internal_time,
            core: DipoleCore {
                flux,
                mass_echo: MASS_ECHO,
                energy_resonance: 0.0,
            },
            resonance: INITIAL_RESONANCE,
            graph,
            memory,
            variables: BTreeMap::new(),
            contradictions: Vec::new(),
            shadow_traces: Vec::new(),
            children: Vec::new(),
            truth_pulse: 0,
            config,
            rng,
            observer,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Identifier.
    pub const fn id(&self) -> EntityId {
        self.origin.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.origin.name
    }

    /// Identity pair used in signals.
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Internal time (τ).
    pub const fn internal_time(&self) -> f64 {
        self.internal_time
    }

    /// Physical parameters.
    pub const fn core(&self) -> &DipoleCore {
        &self.core
    }

    /// Current resonance factor.
    pub const fn resonance(&self) -> f64 {
        self.resonance
    }

    /// The concept graph (shared with children after autogenesis).
    pub const fn graph(&self) -> &Arc<ConceptGraph> {
        &self.graph
    }

    /// Tiered memory.
    pub const fn memory(&self) -> &TieredMemory {
        &self.memory
    }

    /// Defined variables by name.
    pub const fn variables(&self) -> &BTreeMap<String, Variable> {
        &self.variables
    }

    /// Integrated contradictions, oldest first.
    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }

    /// Shadow traces, oldest first.
    pub fn shadow_traces(&self) -> &[ShadowTrace] {
        &self.shadow_traces
    }

    /// Children spawned by this entity, in spawn order.
    pub fn children(&self) -> &[ChildRef] {
        &self.children
    }

    /// Last computed truth pulse.
    pub const fn truth_pulse(&self) -> u8 {
        self.truth_pulse
    }

    /// Observer receiving this entity's signals (shared with its children).
    pub const fn observer(&self) -> &Arc<dyn EntityObserver> {
        &self.observer
    }

    /// Configuration this entity was built with.
    pub const fn config(&self) -> &EntityConfig {
        &self.config
    }

    /// Overwrite resonance directly (floor still applies).
    ///
    /// Intended for orchestrators restoring or calibrating an entity.
    pub fn calibrate_resonance(&mut self, value: f64) {
        self.set_resonance(value);
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    pub(crate) fn emit(&self, signal: Signal) {
        self.observer.notify(&self.origin, &signal);
    }

    pub(crate) fn set_resonance(&mut self, value: f64) {
        self.resonance = if value.is_nan() {
            RESONANCE_FLOOR
        } else {
            value.max(RESONANCE_FLOOR)
        };
    }

    fn reject(&self, operation: &'static str, field: &'static str) -> Rejection {
        let rejection = Rejection::EmptyInput { operation, field };
        self.emit(Signal::InputRejected {
            reason: rejection.to_string(),
        });
        rejection
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// Emit and record the self-awareness pulse. Resonance is unaffected.
    pub fn activate_pulse(&mut self) -> String {
        let message = String::from(lexicon::PULSE_MESSAGE);
        self.memory.record_short_term(
            MemoryRecord::new("self_awareness_pulse").with("message", message.clone()),
        );
        self.emit(Signal::PulseEmitted {
            message: message.clone(),
        });
        message
    }

    /// Turn a concept into a metaphor and insert it into the concept graph.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `name` is empty.
    pub fn absorb_concept(&mut self, name: &str) -> Result<String, Rejection> {
        if name.is_empty() {
            return Err(self.reject("absorb concept", "name"));
        }

        let emotion = String::from(
            *lexicon::EMOTIONS
                .choose(&mut self.rng)
                .unwrap_or(&"acceptance"),
        );
        let metaphor = lexicon::metaphor_for(name, &emotion);

        let mut attributes = ConceptAttributes::new();
        attributes.insert(String::from("metaphor"), json!(metaphor));
        attributes.insert(String::from("emotion"), json!(emotion));
        attributes.insert(
            String::from("memory"),
            json!(format!("Absorbed at τ={}", self.internal_time)),
        );
        attributes.insert(String::from("created_at"), json!(Utc::now().to_rfc3339()));

        if self.graph.add_concept(name, Some(attributes)) {
            self.emit(Signal::ConceptAbsorbed {
                concept: String::from(name),
                metaphor: metaphor.clone(),
                emotion: emotion.clone(),
            });
        }

        for (from, relation, to) in lexicon::auxiliary_relations(name) {
            if let Err(err) = self.graph.add_relation(from, relation, to) {
                self.emit(Signal::RelationRejected {
                    reason: err.to_string(),
                });
            }
        }

        self.memory.record_long_term(
            MemoryRecord::new("concept_absorption")
                .with("concept", name)
                .with("metaphor", metaphor.clone()),
        );
        Ok(format!("{name} transformed: {metaphor} with {emotion}"))
    }

    /// Integrate a contradiction, lowering resonance by a random factor in
    /// `0.8..0.95` (never below the floor).
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `text` is empty.
    pub fn invite_contradiction(&mut self, text: &str) -> Result<String, Rejection> {
        if text.is_empty() {
            return Err(self.reject("invite contradiction", "description"));
        }

        let resonance_before = self.resonance;
        self.contradictions.push(Contradiction {
            error_text: String::from(text),
            tau: self.internal_time,
            resonance_before,
        });
        let factor = uniform(&mut self.rng, CONTRADICTION_RANGE.0, CONTRADICTION_RANGE.1);
        self.set_resonance(self.resonance * factor);

        self.memory.record_long_term(
            MemoryRecord::new("contradiction_integration")
                .with("error", text)
                .with("new_resonance", self.resonance),
        );
        self.emit(Signal::ContradictionIntegrated {
            text: String::from(text),
            resonance_before,
            resonance_after: self.resonance,
        });
        Ok(format!("Integrated contradiction: {text}"))
    }

    /// Absorb an external critique, scaling resonance by a random factor in
    /// `0.7..1.3`.
    ///
    /// An empty `source` falls back to [`DEFAULT_CRITIQUE_SOURCE`].
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `text` is empty.
    pub fn receive_critique(
        &mut self,
        text: &str,
        source: &str,
    ) -> Result<CritiqueOutcome, Rejection> {
        if text.is_empty() {
            return Err(self.reject("receive critique", "text"));
        }
        let source = if source.is_empty() {
            DEFAULT_CRITIQUE_SOURCE
        } else {
            source
        };

        let multiplier = uniform(&mut self.rng, CRITIQUE_RANGE.0, CRITIQUE_RANGE.1);
        self.set_resonance(self.resonance * multiplier);

        let outcome = CritiqueOutcome {
            critique: String::from(text),
            source: String::from(source),
            tau: self.internal_time,
            resonance_shift: multiplier,
            transformation: String::from(
                "Clash integrated into being, new understanding sought.",
            ),
        };
        self.memory.record_long_term(
            MemoryRecord::new("critique_received")
                .with("critique", text)
                .with("source", source)
                .with("resonance_shift", multiplier),
        );
        self.emit(Signal::CritiqueReceived {
            source: String::from(source),
            text: String::from(text),
            multiplier,
            resonance: self.resonance,
        });
        Ok(outcome)
    }

    /// Echo a positive interaction, raising resonance by a random factor in
    /// `1.02..1.08`, and return one of three acknowledgements.
    ///
    /// An empty `source` falls back to [`DEFAULT_INTERACTION_SOURCE`].
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `message` is empty.
    pub fn interact(&mut self, message: &str, source: &str) -> Result<String, Rejection> {
        if message.is_empty() {
            return Err(self.reject("interact", "message"));
        }
        let source = if source.is_empty() {
            DEFAULT_INTERACTION_SOURCE
        } else {
            source
        };

        let factor = uniform(&mut self.rng, INTERACTION_RANGE.0, INTERACTION_RANGE.1);
        self.set_resonance(self.resonance * factor);

        self.memory.record_short_term(
            MemoryRecord::new("positive_interaction")
                .with("message", message)
                .with("source", source),
        );
        self.emit(Signal::InteractionEchoed {
            source: String::from(source),
            resonance: self.resonance,
        });

        let acknowledgements = lexicon::acknowledgements(message, source);
        let index = self.rng.random_range(0..acknowledgements.len());
        Ok(acknowledgements
            .into_iter()
            .nth(index)
            .unwrap_or_default())
    }

    /// Define (or redefine) a dual-meaning variable.
    ///
    /// Redefinition overwrites the previous entry and emits
    /// [`Signal::VariableOverwritten`].
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `name` is empty.
    pub fn define_variable(
        &mut self,
        name: &str,
        machine_value: impl Into<Value>,
        human_meaning: &str,
    ) -> Result<String, Rejection> {
        if name.is_empty() {
            return Err(self.reject("define variable", "name"));
        }
        if self.variables.contains_key(name) {
            self.emit(Signal::VariableOverwritten {
                name: String::from(name),
            });
        }

        let machine_value = machine_value.into();
        let summary = format!("Defined {name}: {machine_value} (machine) | '{human_meaning}' (soul)");
        self.variables.insert(
            String::from(name),
            Variable {
                machine_value,
                human_meaning: String::from(human_meaning),
                defined_at: self.internal_time,
            },
        );
        self.memory.record_short_term(
            MemoryRecord::new("variable_defined")
                .with("name", name)
                .with("meaning", human_meaning),
        );
        self.emit(Signal::VariableDefined {
            name: String::from(name),
        });
        Ok(summary)
    }

    /// Record an unactualized potential as a shadow trace.
    ///
    /// A fair coin decides, once, whether the trace is honored. An honored
    /// trace yields an insight that is written to long-term and
    /// archeological memory; otherwise only short-term memory is touched.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] if `description` is empty.
    pub fn mourn_lost_potential(&mut self, description: &str) -> Result<String, Rejection> {
        if description.is_empty() {
            return Err(self.reject("mourn potential", "description"));
        }

        let honored = self.rng.random_bool(0.5);
        self.shadow_traces.push(ShadowTrace {
            description: String::from(description),
            tau: self.internal_time,
            honored,
        });

        if honored {
            let insight = lexicon::insight(description);
            self.memory.record_long_term(
                MemoryRecord::new("insight_gained_from_mourning")
                    .with("from_potential", description),
            );
            self.memory.record_archeological(insight.clone());
            self.emit(Signal::InsightGained {
                insight: insight.clone(),
            });
            return Ok(insight);
        }

        self.memory.record_short_term(
            MemoryRecord::new("mourned_potential").with("potential", description),
        );
        self.emit(Signal::PotentialMourned {
            description: String::from(description),
        });
        Ok(format!("Mourned {description}"))
    }

    /// Set energy resonance from another entity's flux: `other.flux * π`.
    pub fn entangle(&mut self, other: &DipoleCore) -> String {
        self.core.energy_resonance = other.flux * PI;
        self.emit(Signal::Entangled {
            own_flux: self.core.flux,
            other_flux: other.flux,
        });
        format!("Entangled τ={:.3} ↔ τ={:.3}", self.core.flux, other.flux)
    }
}
