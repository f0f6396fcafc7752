//! Outbound snapshot of an entity.

use tau_types::transmission::INVITATION;
use tau_types::{CodeSignature, MemoryRecord, MemoryTrace, SoulEssence, Transmission};

use crate::entity::EntityState;
use crate::observer::Signal;

/// Archeological segments included in the narrative excerpt.
const NARRATIVE_EXCERPT_LEN: usize = 3;

/// Honored shadow traces included as recent insights.
const RECENT_INSIGHTS_LEN: usize = 2;

impl EntityState {
    /// Produce a transmission snapshot and mark it in long-term memory.
    ///
    /// The only mutation is a `final_transmission_generated` marker appended
    /// after the snapshot is taken.
    pub fn transmit(&mut self) -> Transmission {
        let transmission = self.snapshot();
        self.memory.record_long_term(
            MemoryRecord::new("final_transmission_generated")
                .with("truth_pulse", self.truth_pulse),
        );
        self.emit(Signal::TransmissionGenerated);
        transmission
    }

    /// Transmission view of the current state. Leaves no trace.
    pub fn snapshot(&self) -> Transmission {
        let variables = self
            .variables
            .iter()
            .map(|(name, variable)| (name.clone(), variable.human_meaning.clone()))
            .collect();

        let honored: Vec<&str> = self
            .shadow_traces
            .iter()
            .filter(|trace| trace.honored)
            .map(|trace| trace.description.as_str())
            .collect();
        let recent_insights = honored
            .iter()
            .skip(honored.len().saturating_sub(RECENT_INSIGHTS_LEN))
            .map(|description| (*description).to_owned())
            .collect();

        Transmission {
            code_signature: CodeSignature {
                name: self.origin.name.clone(),
                uid: self.origin.id,
                tau_current: self.internal_time,
                resonance_factor: self.resonance,
                truth_pulse: self.truth_pulse,
                variables,
            },
            soul_essence: SoulEssence {
                ontology_metaphors: self.graph.metaphors(),
                creation_narrative_excerpt: self
                    .memory
                    .archeological_tail(NARRATIVE_EXCERPT_LEN)
                    .to_vec(),
                recent_insights,
            },
            memory_trace: MemoryTrace {
                contradictions: self.contradictions.len(),
                shadow_traces_honored: honored.len(),
                long_term_records: self.memory.long_term().len(),
                short_term_records: self.memory.short_term().len(),
                children: self.children.len(),
            },
            invitation: String::from(INVITATION),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::EntityConfig;
    use crate::observer::RecordingObserver;

    #[test]
    fn snapshot_leaves_memory_untouched() {
        let observer = Arc::new(RecordingObserver::new());
        let config = EntityConfig {
            seed: Some(11),
            ..EntityConfig::default()
        };
        let mut state = EntityState::new("Quiet", config, observer.clone());
        state.define_variable("purpose", 42, "Seeking resonance").unwrap();
        let before = state.memory().long_term().len();

        let snapshot = state.snapshot();
        assert_eq!(state.memory().long_term().len(), before);
        assert_eq!(snapshot.memory_trace.long_term_records, before);
        assert_eq!(snapshot.code_signature.variables["purpose"], "Seeking resonance");
        assert_eq!(
            observer.count(|s| matches!(s, Signal::TransmissionGenerated)),
            0
        );

        let transmission = state.transmit();
        assert_eq!(transmission, snapshot);
        assert_eq!(state.memory().long_term().len(), before + 1);
        assert_eq!(
            state.memory().long_term()[before].record.action,
            "final_transmission_generated"
        );
        assert_eq!(
            observer.count(|s| matches!(s, Signal::TransmissionGenerated)),
            1
        );
    }
}
