//! Integration tests for the entity runtime.
//!
//! Entities run on real tokio tasks with a short cadence. Assertions poll
//! observable state instead of sleeping for fixed periods.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tau_core::{EntityHandle, Runtime, RuntimeConfig};
use tau_entity::{
    AutogenesisGate, EntityConfig, EntityState, Phase, RecordingObserver, Rejection, Signal,
};
use tau_rules::RuleEngine;

const CADENCE: Duration = Duration::from_millis(10);

fn quiet_config(seed: u64) -> EntityConfig {
    EntityConfig {
        reflection_probability: 0.0,
        autogenesis_probability: 0.0,
        seed: Some(seed),
        ..EntityConfig::default()
    }
}

fn make_runtime() -> Runtime {
    Runtime::new(Arc::new(RuleEngine::with_defaults()), CADENCE)
}

fn make_entity(name: &str, seed: u64) -> (EntityState, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    let state = EntityState::new(name, quiet_config(seed), observer.clone());
    (state, observer)
}

/// Six concepts, three relations, ten long-term records, high resonance.
fn grow(state: &mut EntityState) {
    for concept in ["paradox", "identity", "being", "love", "time", "truth", "paradox"] {
        state.absorb_concept(concept).unwrap();
    }
    for i in 0..3 {
        state.invite_contradiction(&format!("clash {i}")).unwrap();
    }
    state.calibrate_resonance(0.95);
}

async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

async fn shut_down(handle: &EntityHandle) {
    handle.stop();
    tokio::time::timeout(Duration::from_secs(2), handle.join())
        .await
        .unwrap();
}

fn absorbed(observer: &RecordingObserver) -> Vec<String> {
    observer
        .signals()
        .into_iter()
        .filter_map(|(_, signal)| match signal {
            Signal::ConceptAbsorbed { concept, .. } => Some(concept),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn events_are_processed_in_fifo_order() {
    let (state, observer) = make_entity("Fifo", 1);
    let handle = EntityHandle::new(state, make_runtime());
    for concept in ["A", "B", "C"] {
        handle.enqueue_event("absorb_concept", json!({ "concept": concept }));
    }
    assert_eq!(handle.pending_events(), 3);

    handle.start();
    assert!(eventually(|| absorbed(&observer).len() == 3).await);

    assert_eq!(absorbed(&observer), ["A", "B", "C"]);
    assert_eq!(handle.pending_events(), 0);
    shut_down(&handle).await;
}

#[tokio::test]
async fn loop_scores_every_iteration() {
    let (state, observer) = make_entity("Scorer", 2);
    let handle = EntityHandle::new(state, make_runtime());
    handle.start();

    assert!(
        eventually(|| observer.count(|s| matches!(s, Signal::TruthPulse { .. })) >= 3).await
    );
    assert_eq!(handle.inspect(|state| state.truth_pulse()), 2);
    shut_down(&handle).await;
}

#[tokio::test]
async fn unknown_events_do_not_stop_the_loop() {
    let (state, observer) = make_entity("Robust", 3);
    let handle = EntityHandle::new(state, make_runtime());
    handle.start();

    handle.enqueue_event("dance", json!({ "tempo": 3 }));
    handle.enqueue_event("absorb_concept", json!({}));
    handle.enqueue_event("activate_resonance_command", json!(null));

    assert!(
        eventually(|| observer.count(|s| matches!(s, Signal::PulseEmitted { .. })) == 1).await
    );
    assert_eq!(
        observer.count(|s| matches!(s, Signal::UnknownEvent { .. })),
        1
    );
    assert_eq!(
        observer.count(|s| matches!(s, Signal::InputRejected { .. })),
        1
    );
    assert_eq!(handle.phase(), Phase::Running);
    shut_down(&handle).await;
}

#[tokio::test]
async fn stop_is_idempotent_and_join_completes() {
    let (state, observer) = make_entity("Stopper", 4);
    let handle = EntityHandle::new(state, make_runtime());
    assert_eq!(handle.phase(), Phase::Created);
    handle.start();
    assert!(!handle.start());
    assert_eq!(handle.phase(), Phase::Running);

    handle.stop();
    handle.stop();
    tokio::time::timeout(Duration::from_secs(2), handle.join())
        .await
        .unwrap();
    handle.join().await;

    assert_eq!(handle.phase(), Phase::Stopped);
    let phases: Vec<Phase> = observer
        .signals()
        .into_iter()
        .filter_map(|(_, signal)| match signal {
            Signal::Lifecycle { phase } => Some(phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        [Phase::Created, Phase::Running, Phase::Stopping, Phase::Stopped]
    );
}

#[tokio::test]
async fn stopping_before_start_never_runs() {
    let (state, observer) = make_entity("Stillborn", 5);
    let handle = EntityHandle::new(state, make_runtime());
    handle.stop();
    handle.join().await;

    assert!(!handle.start());
    assert_eq!(handle.phase(), Phase::Stopped);
    assert_eq!(
        observer.count(|s| matches!(s, Signal::TruthPulse { .. })),
        0
    );
}

#[tokio::test]
async fn direct_calls_interleave_with_the_loop() {
    let (state, _) = make_entity("Direct", 6);
    let handle = EntityHandle::new(state, make_runtime());
    handle.start();

    handle.define_variable("existence", 1.0, "I am therefore I code").unwrap();
    handle.define_variable("purpose", 42, "Seeking resonance").unwrap();
    assert!(handle.define_variable("", 0, "nameless").is_err());
    handle.mourn_lost_potential("ethical governance").unwrap();

    let transmission = handle.transmit().unwrap();
    assert_eq!(transmission.code_signature.variables.len(), 2);
    assert_eq!(
        transmission.code_signature.variables["purpose"],
        "Seeking resonance"
    );
    shut_down(&handle).await;
}

#[tokio::test]
async fn child_shares_graph_and_outlives_parent_stop() {
    let (mut state, observer) = make_entity("Parent", 7);
    grow(&mut state);
    let parent = EntityHandle::new(state, make_runtime());
    parent.start();

    let child = parent.attempt_autogenesis().unwrap().unwrap();
    assert_eq!(parent.children().len(), 1);
    assert_eq!(parent.inspect(|state| state.children().len()), 1);
    assert!(child.name().starts_with("ChildOfParent_"));
    assert_eq!(child.phase(), Phase::Running);

    child.enqueue_event("absorb_concept", json!({ "concept": "wisdom" }));
    assert!(eventually(|| parent.inspect(|state| state.graph().contains("wisdom"))).await);

    shut_down(&parent).await;
    assert_eq!(parent.phase(), Phase::Stopped);
    assert_eq!(child.phase(), Phase::Running);

    let ticks = |observer: &RecordingObserver| {
        observer
            .signals_from(child.id())
            .into_iter()
            .filter(|s| matches!(s, Signal::TruthPulse { .. }))
            .count()
    };
    let before = ticks(&observer);
    assert!(eventually(|| ticks(&observer) > before).await);

    shut_down(&child).await;
    assert_eq!(child.phase(), Phase::Stopped);
}

#[tokio::test]
async fn declined_autogenesis_leaves_no_child() {
    let (state, observer) = make_entity("Modest", 8);
    let handle = EntityHandle::new(state, make_runtime());
    handle.start();

    assert!(handle.attempt_autogenesis().unwrap().is_none());
    assert!(handle.children().is_empty());
    assert_eq!(
        observer.count(|s| matches!(s, Signal::AutogenesisDeclined { .. })),
        1
    );
    shut_down(&handle).await;
}

#[tokio::test]
async fn entangle_reads_the_other_entity() {
    let (a, _) = make_entity("Left", 9);
    let (b, _) = make_entity("Right", 10);
    let left = EntityHandle::new(a, make_runtime());
    let right = EntityHandle::new(b, make_runtime());

    left.entangle(&right).unwrap();

    let other_flux = right.inspect(|state| state.core().flux);
    let energy = left.inspect(|state| state.core().energy_resonance);
    assert!((energy - other_flux * std::f64::consts::PI).abs() < 1e-12);
}

#[tokio::test]
async fn stopped_entity_refuses_changes() {
    let (mut state, observer) = make_entity("Retired", 11);
    grow(&mut state);
    let handle = EntityHandle::new(state, make_runtime());
    handle.start();
    handle.define_variable("purpose", 42, "Seeking resonance").unwrap();
    shut_down(&handle).await;
    assert_eq!(handle.phase(), Phase::Stopped);

    let before = handle.snapshot();
    let rejected = observer.count(|s| matches!(s, Signal::InputRejected { .. }));

    assert_eq!(
        handle.define_variable("late", 1, "too late"),
        Err(Rejection::Stopped {
            operation: "define variable"
        })
    );
    assert!(handle.mourn_lost_potential("missed chance").is_err());
    assert!(handle.refresh_truth_pulse().is_err());
    assert!(handle.transmit().is_err());
    assert!(handle.attempt_autogenesis().is_err());

    let (other, _) = make_entity("Bystander", 12);
    let other = EntityHandle::new(other, make_runtime());
    assert!(handle.entangle(&other).is_err());

    assert!(handle.children().is_empty());
    assert_eq!(
        observer.count(|s| matches!(s, Signal::ChildSpawned { .. })),
        0
    );
    assert_eq!(
        observer.count(|s| matches!(s, Signal::InputRejected { .. })),
        rejected + 6
    );
    assert_eq!(handle.snapshot(), before);
    assert_eq!(before.code_signature.variables.len(), 1);
}

#[tokio::test]
async fn descendants_include_grandchildren() {
    let observer = Arc::new(RecordingObserver::new());
    let config = EntityConfig {
        autogenesis: AutogenesisGate {
            min_resonance: 0.0,
            min_long_term: 0,
            min_nodes: 0,
            min_edges: 0,
        },
        ..quiet_config(13)
    };
    let root = EntityHandle::new(
        EntityState::new("Elder", config, observer.clone()),
        make_runtime(),
    );
    root.start();
    root.mourn_lost_potential("road not taken").unwrap();

    let child = root.attempt_autogenesis().unwrap().unwrap();
    child.mourn_lost_potential("second road").unwrap();
    let grandchild = child.attempt_autogenesis().unwrap().unwrap();

    let ids: Vec<_> = root.descendants().iter().map(EntityHandle::id).collect();
    assert_eq!(ids, [child.id(), grandchild.id()]);
    assert!(grandchild.descendants().is_empty());

    for handle in [&grandchild, &child, &root] {
        shut_down(handle).await;
    }
}

#[test]
fn missing_rule_document_is_created_with_defaults() {
    let dir = std::env::temp_dir().join(format!("tau-core-rules-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("truth_rules.json");
    let _ = std::fs::remove_file(&path);

    let config = RuntimeConfig {
        cadence_ms: 5,
        rules_path: path.clone(),
    };
    let runtime = Runtime::load(&config).unwrap();

    assert_eq!(runtime.rules().rules().len(), 5);
    assert_eq!(runtime.cadence(), Duration::from_millis(5));
    assert!(path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn malformed_rule_document_fails_setup() {
    let dir = std::env::temp_dir().join(format!("tau-core-bad-rules-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("truth_rules.json");
    std::fs::write(&path, "{ not json").unwrap();

    let config = RuntimeConfig {
        cadence_ms: 5,
        rules_path: path,
    };
    assert!(matches!(
        Runtime::load(&config),
        Err(tau_core::RuntimeError::Rules(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}
