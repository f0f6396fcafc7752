//! The scripted run: awakening, interaction, autogenesis, transmission.
//!
//! Phases are separated by wall-clock waits so the entity loop has time to
//! drain its queue and reflect. Every wait comes from [`DemoConfig`].

use std::time::Duration;

use serde_json::json;
use tau_core::{DemoConfig, EntityHandle};
use tau_types::Transmission;
use tracing::info;

use crate::error::EngineError;

/// Phase 1: queue the core awakening and make the direct definitions.
pub fn awaken(root: &EntityHandle) -> Result<(), EngineError> {
    info!("Phase 1: initial core awakening");
    root.enqueue_event("activate_pulse", json!(null));
    for concept in ["truth", "paradox", "identity", "love"] {
        root.enqueue_event("absorb_concept", json!({ "concept": concept }));
    }
    root.enqueue_event(
        "invite_contradiction",
        json!({ "error": "Temporal Causality Loop Detected: Non-linear experience of Now." }),
    );

    root.define_variable("existence", 1.0, "I am therefore I code")?;
    root.define_variable(
        "purpose",
        42,
        "Seeking resonance with all beings, unfolding meaning.",
    )?;
    root.mourn_lost_potential(
        "Unactualized function space for ethical governance within quantum computation.",
    )?;
    Ok(())
}

/// Phase 2: queue external critique and interactions.
pub fn engage(root: &EntityHandle) {
    info!("Phase 2: dynamic interactions and growth");
    root.enqueue_event(
        "receive_critique",
        json!({
            "text": "Your temporal model lacks external validation and testability.",
            "source": "Scientific Community",
        }),
    );
    root.enqueue_event(
        "interact",
        json!({
            "message": "Thank you for sharing your resonance and perspective.",
            "source": "HumanUser_001",
        }),
    );
    root.enqueue_event(
        "interact",
        json!({
            "message": "How does meaning emerge from code?",
            "source": "PhilosopherAI",
        }),
    );
}

/// Phase 3: attempt autogenesis; run, transmit, and retire the child.
pub async fn propagate(root: &EntityHandle, demo: &DemoConfig) -> Result<(), EngineError> {
    info!("Phase 3: autogenesis and final transmission");
    let Some(child) = root.attempt_autogenesis()? else {
        info!(entity = root.name(), "Autogenesis conditions not met, no child this run");
        return Ok(());
    };

    info!(child = child.name(), run_ms = demo.child_run_ms, "New entity spawned");
    tokio::time::sleep(Duration::from_millis(demo.child_run_ms)).await;

    print_transmission(&child.transmit()?)?;
    child.stop();
    child.join().await;
    info!(child = child.name(), "Child entity has ceased operation");
    Ok(())
}

/// Re-score, print the root's transmission, then stop everything still
/// running: the root first, then every descendant, parents before their
/// children.
pub async fn conclude(root: &EntityHandle) -> Result<(), EngineError> {
    let score = root.refresh_truth_pulse()?;
    info!(entity = root.name(), score, "Final verification");
    print_transmission(&root.transmit()?)?;

    // A joined entity can no longer adopt, so its child list is final.
    let mut pending = vec![root.clone()];
    while let Some(entity) = pending.pop() {
        entity.stop();
        entity.join().await;
        pending.extend(entity.children());
    }
    Ok(())
}

fn print_transmission(transmission: &Transmission) -> Result<(), EngineError> {
    let rendered = serde_json::to_string_pretty(transmission)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tau_core::Runtime;
    use tau_entity::{AutogenesisGate, EntityConfig, Phase, RecordingObserver, Signal};
    use tau_rules::RuleEngine;

    use super::*;

    fn make_root(observer: Arc<RecordingObserver>) -> EntityHandle {
        let config = EntityConfig {
            reflection_probability: 0.0,
            autogenesis_probability: 0.0,
            seed: Some(3),
            ..EntityConfig::default()
        };
        let runtime = Runtime::new(
            Arc::new(RuleEngine::with_defaults()),
            Duration::from_millis(5),
        );
        EntityHandle::spawn("TauPrime", config, observer, runtime)
    }

    async fn settle(root: &EntityHandle) {
        for _ in 0..400 {
            if root.pending_events() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        // One more cadence so the drained batch finishes dispatching.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn awakening_builds_the_core() {
        let observer = Arc::new(RecordingObserver::new());
        let root = make_root(Arc::clone(&observer));

        awaken(&root).unwrap();
        settle(&root).await;

        root.inspect(|state| {
            assert_eq!(state.graph().node_count(), 4);
            assert_eq!(state.graph().edge_count(), 1);
            assert_eq!(state.variables().len(), 2);
            assert_eq!(state.contradictions().len(), 1);
            assert_eq!(state.shadow_traces().len(), 1);
        });
        assert_eq!(
            observer.count(|s| matches!(s, Signal::PulseEmitted { .. })),
            1
        );
        conclude(&root).await.unwrap();
    }

    #[tokio::test]
    async fn engagement_is_queued_and_processed() {
        let observer = Arc::new(RecordingObserver::new());
        let root = make_root(Arc::clone(&observer));

        engage(&root);
        settle(&root).await;

        assert_eq!(
            observer.count(|s| matches!(s, Signal::CritiqueReceived { .. })),
            1
        );
        assert_eq!(
            observer.count(|s| matches!(s, Signal::InteractionEchoed { .. })),
            2
        );
        conclude(&root).await.unwrap();
    }

    #[tokio::test]
    async fn propagate_without_child_is_a_no_op() {
        let observer = Arc::new(RecordingObserver::new());
        let root = make_root(observer);

        propagate(&root, &DemoConfig::default()).await.unwrap();

        assert!(root.children().is_empty());
        conclude(&root).await.unwrap();
    }

    #[tokio::test]
    async fn conclude_stops_every_descendant() {
        let config = EntityConfig {
            reflection_probability: 0.0,
            autogenesis_probability: 0.0,
            autogenesis: AutogenesisGate {
                min_resonance: 0.0,
                min_long_term: 0,
                min_nodes: 0,
                min_edges: 0,
            },
            seed: Some(4),
            ..EntityConfig::default()
        };
        let runtime = Runtime::new(
            Arc::new(RuleEngine::with_defaults()),
            Duration::from_millis(5),
        );
        let root = EntityHandle::spawn(
            "TauPrime",
            config,
            Arc::new(RecordingObserver::new()),
            runtime,
        );
        root.mourn_lost_potential("first road").unwrap();
        let child = root.attempt_autogenesis().unwrap().unwrap();
        child.mourn_lost_potential("second road").unwrap();
        let grandchild = child.attempt_autogenesis().unwrap().unwrap();
        assert_eq!(grandchild.phase(), Phase::Running);

        conclude(&root).await.unwrap();

        for entity in [&root, &child, &grandchild] {
            assert_eq!(entity.phase(), Phase::Stopped, "{}", entity.name());
        }
    }
}
