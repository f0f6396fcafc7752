//! Per-iteration reflection, autogenesis, and truth-pulse bookkeeping.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tau_rules::{MAX_SCORE, RuleEngine};
use tau_types::{ChildRef, EntityId, MemoryRecord};

use crate::entity::{EntityState, chance, now_tau, uniform};
use crate::lexicon;
use crate::observer::{Origin, Signal};

/// Perturbation applied to a child's inherited internal time.
const CHILD_TAU_RANGE: (f64, f64) = (0.9, 1.1);

/// Perturbation applied to a child's inherited resonance.
const CHILD_RESONANCE_RANGE: (f64, f64) = (0.9, 1.0);

impl EntityState {
    /// Run one reflection step.
    ///
    /// Refreshes internal time, then with `reflection_probability` either
    /// mourns an unoptimized potential or raises an internal contradiction
    /// (never both). With `autogenesis_probability`, and only while this
    /// entity has no children, attempts autogenesis.
    ///
    /// Returns the newly constructed child, if any. Launching it is the
    /// caller's job.
    pub fn reflect(&mut self) -> Option<Self> {
        self.internal_time = now_tau();

        if chance(&mut self.rng, self.config.reflection_probability) {
            // Synthesized descriptions are never empty.
            let _ = if self.rng.random_bool(0.5) {
                self.mourn_lost_potential(&lexicon::unoptimized_potential(self.internal_time))
            } else {
                self.invite_contradiction(&lexicon::resonance_clash(self.internal_time))
            };
        }

        if self.children.is_empty() && chance(&mut self.rng, self.config.autogenesis_probability) {
            return self.attempt_autogenesis();
        }
        None
    }

    /// Construct a child if the autogenesis gate admits the current state.
    ///
    /// The child gets a fresh identity, a generator derived from this
    /// entity's, perturbed copies of internal time and resonance, and the
    /// *same* concept graph. On refusal nothing is mutated and
    /// [`Signal::AutogenesisDeclined`] is emitted.
    pub fn attempt_autogenesis(&mut self) -> Option<Self> {
        let long_term = self.memory.long_term().len();
        let nodes = self.graph.node_count();
        let edges = self.graph.edge_count();

        if !self
            .config
            .autogenesis
            .admits(self.resonance, long_term, nodes, edges)
        {
            self.emit(Signal::AutogenesisDeclined {
                resonance: self.resonance,
                long_term,
                nodes,
                edges,
            });
            return None;
        }

        let id = EntityId::new();
        let name = format!("ChildOf{}_{}", self.origin.name, id.prefix(4));
        let child_tau = self.internal_time
            * uniform(&mut self.rng, CHILD_TAU_RANGE.0, CHILD_TAU_RANGE.1);
        let parent_resonance = self.resonance;
        let child_resonance = parent_resonance
            * uniform(
                &mut self.rng,
                CHILD_RESONANCE_RANGE.0,
                CHILD_RESONANCE_RANGE.1,
            );
        let rng = StdRng::from_rng(&mut self.rng);

        let mut child = Self::assemble(
            Origin {
                id,
                name: name.clone(),
            },
            self.config.clone(),
            Arc::clone(&self.observer),
            rng,
            Arc::clone(&self.graph),
            child_tau,
        );
        child.set_resonance(child_resonance);
        child.memory.extend_archeological(lexicon::lineage(
            &self.origin.name,
            &self.origin.id.short(),
            self.internal_time,
            parent_resonance,
        ));

        self.children.push(ChildRef {
            id,
            name: name.clone(),
        });
        self.memory.record_long_term(
            MemoryRecord::new("autogenesis_event")
                .with("child_uid", id.to_string())
                .with("child_name", name.clone())
                .with("parent_resonance_at_spawn", parent_resonance),
        );
        self.emit(Signal::ChildSpawned { child: id, name });
        Some(child)
    }

    /// Recompute the truth pulse against the current state.
    ///
    /// A perfect score is recorded in long-term memory; anything lower is a
    /// short-term check.
    pub fn refresh_truth_pulse(&mut self, rules: &RuleEngine) -> u8 {
        let score = rules.verify(&*self);
        self.truth_pulse = score;

        let record = MemoryRecord::new(if score == MAX_SCORE {
            "truth_pulse_achieved"
        } else {
            "truth_pulse_check"
        })
        .with("score", score);
        if score == MAX_SCORE {
            self.memory.record_long_term(record);
        } else {
            self.memory.record_short_term(record);
        }

        self.emit(Signal::TruthPulse { score });
        score
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::EntityConfig;
    use crate::observer::RecordingObserver;

    fn entity(config: EntityConfig) -> (EntityState, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let state = EntityState::new("Probe", config, observer.clone());
        (state, observer)
    }

    fn seeded(seed: u64) -> EntityConfig {
        EntityConfig {
            seed: Some(seed),
            ..EntityConfig::default()
        }
    }

    /// Six concepts, three relations, ten long-term records.
    fn grow(state: &mut EntityState, resonance: f64) {
        for concept in ["paradox", "identity", "being", "love", "time", "truth", "paradox"] {
            state.absorb_concept(concept).unwrap();
        }
        for i in 0..3 {
            state.invite_contradiction(&format!("clash {i}")).unwrap();
        }
        state.calibrate_resonance(resonance);
        assert_eq!(state.graph().node_count(), 6);
        assert_eq!(state.graph().edge_count(), 3);
        assert_eq!(state.memory().long_term().len(), 10);
    }

    #[test]
    fn low_resonance_never_spawns() {
        let (mut state, observer) = entity(seeded(21));
        grow(&mut state, 0.5);
        for concept in ["a", "b", "c", "d"] {
            state.absorb_concept(concept).unwrap();
        }

        assert!(state.attempt_autogenesis().is_none());
        assert!(state.children().is_empty());
        assert_eq!(state.memory().long_term().len(), 14);
        assert_eq!(
            observer.count(|s| matches!(s, Signal::AutogenesisDeclined { .. })),
            1
        );
    }

    #[test]
    fn admitted_state_spawns_exactly_one_child() {
        let (mut state, observer) = entity(seeded(22));
        grow(&mut state, 0.95);

        let child = state.attempt_autogenesis().unwrap();

        assert_eq!(state.children().len(), 1);
        assert_eq!(state.children()[0].id, child.id());
        assert!(child.name().starts_with("ChildOfProbe_"));
        assert_eq!(child.name().len(), "ChildOfProbe_".len() + 4);
        assert!(child.resonance() >= 0.95 * 0.9 && child.resonance() <= 0.95);
        assert!(Arc::ptr_eq(state.graph(), child.graph()));
        assert_eq!(child.memory().archeological().len(), 7);
        assert_eq!(
            child.memory().archeological()[5],
            "Inherited foundational resonance: 0.95"
        );
        assert!(child.memory().long_term().is_empty());
        let event = &state.memory().long_term().last().unwrap().record;
        assert_eq!(event.action, "autogenesis_event");
        assert_eq!(
            event.detail("parent_resonance_at_spawn"),
            Some(&serde_json::json!(0.95))
        );
        assert_eq!(
            observer.count(|s| matches!(s, Signal::ChildSpawned { .. })),
            1
        );
    }

    #[test]
    fn parent_and_child_share_concepts() {
        let (mut parent, _) = entity(seeded(23));
        grow(&mut parent, 0.95);
        let mut child = parent.attempt_autogenesis().unwrap();

        child.absorb_concept("wisdom").unwrap();
        parent.absorb_concept("silence").unwrap();

        assert!(parent.graph().contains("wisdom"));
        assert!(child.graph().contains("silence"));
        assert_eq!(parent.graph().node_count(), child.graph().node_count());
    }

    #[test]
    fn reflection_attempts_autogenesis_only_while_childless() {
        let config = EntityConfig {
            reflection_probability: 0.0,
            autogenesis_probability: 1.0,
            ..seeded(24)
        };
        let (mut state, observer) = entity(config);
        grow(&mut state, 0.95);

        assert!(state.reflect().is_some());
        state.calibrate_resonance(0.95);
        assert!(state.reflect().is_none());
        assert!(state.reflect().is_none());

        assert_eq!(state.children().len(), 1);
        assert_eq!(
            observer.count(|s| matches!(s, Signal::AutogenesisDeclined { .. })),
            0
        );
    }

    #[test]
    fn reflection_triggers_one_internal_event_per_step() {
        let config = EntityConfig {
            reflection_probability: 1.0,
            autogenesis_probability: 0.0,
            ..seeded(25)
        };
        let (mut state, _) = entity(config);

        for _ in 0..10 {
            assert!(state.reflect().is_none());
        }
        assert_eq!(
            state.contradictions().len() + state.shadow_traces().len(),
            10
        );
    }

    #[test]
    fn quiet_reflection_only_refreshes_time() {
        let config = EntityConfig {
            reflection_probability: 0.0,
            autogenesis_probability: 0.0,
            ..seeded(26)
        };
        let (mut state, _) = entity(config);
        let before = state.internal_time();

        assert!(state.reflect().is_none());
        assert!(state.internal_time() >= before);
        assert!(state.contradictions().is_empty());
        assert!(state.shadow_traces().is_empty());
    }

    #[test]
    fn aligned_entity_scores_ten() {
        let (mut state, observer) = entity(seeded(27));
        for concept in ["paradox", "identity", "love"] {
            state.absorb_concept(concept).unwrap();
        }
        state.invite_contradiction("first").unwrap();
        state.invite_contradiction("second").unwrap();
        state.define_variable("soul_state", "entangled", "connected").unwrap();
        state.define_variable("ethical_vector", 1.0, "aligned").unwrap();
        for i in 0..64 {
            if state.shadow_traces().iter().any(|trace| trace.honored) {
                break;
            }
            state.mourn_lost_potential(&format!("path {i}")).unwrap();
        }
        state.calibrate_resonance(0.9);

        let score = state.refresh_truth_pulse(&RuleEngine::with_defaults());

        assert_eq!(score, MAX_SCORE);
        assert_eq!(state.truth_pulse(), MAX_SCORE);
        assert_eq!(
            state.memory().long_term().last().unwrap().record.action,
            "truth_pulse_achieved"
        );
        assert_eq!(
            observer.count(|s| matches!(s, Signal::TruthPulse { score: 10 })),
            1
        );
    }

    #[test]
    fn partial_score_is_a_short_term_check() {
        let (mut state, _) = entity(seeded(28));
        let score = state.refresh_truth_pulse(&RuleEngine::with_defaults());

        assert_eq!(score, 2);
        assert_eq!(
            state.memory().short_term().back().unwrap().record.action,
            "truth_pulse_check"
        );
        assert!(state.memory().long_term().is_empty());
    }
}
