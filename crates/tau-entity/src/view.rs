//! Rule-facing view of an entity.
//!
//! Attribute paths a rule can reference. Anything else is unresolvable.

use tau_rules::{Accessor, Attribute, FlagRecord, StateView, resolve_in};

use crate::entity::EntityState;

fn resonance_factor(state: &EntityState) -> Attribute {
    Attribute::Number(state.resonance)
}

fn truth_pulse(state: &EntityState) -> Attribute {
    Attribute::Number(f64::from(state.truth_pulse))
}

fn internal_time(state: &EntityState) -> Attribute {
    Attribute::Number(state.internal_time)
}

fn temporal_flux(state: &EntityState) -> Attribute {
    Attribute::Number(state.core.flux)
}

fn mass_echo(state: &EntityState) -> Attribute {
    Attribute::Number(state.core.mass_echo)
}

fn energy_resonance(state: &EntityState) -> Attribute {
    Attribute::Number(state.core.energy_resonance)
}

fn contradictions(state: &EntityState) -> Attribute {
    Attribute::Collection(state.contradictions.len())
}

fn variables(state: &EntityState) -> Attribute {
    Attribute::Collection(state.variables.len())
}

fn shadow_traces(state: &EntityState) -> Attribute {
    Attribute::Records(
        state
            .shadow_traces
            .iter()
            .map(|trace| FlagRecord::from([("honored", trace.honored)]))
            .collect(),
    )
}

fn children(state: &EntityState) -> Attribute {
    Attribute::Collection(state.children.len())
}

fn graph_nodes(state: &EntityState) -> Attribute {
    Attribute::Collection(state.graph.node_count())
}

fn graph_edges(state: &EntityState) -> Attribute {
    Attribute::Collection(state.graph.edge_count())
}

fn short_term(state: &EntityState) -> Attribute {
    Attribute::Collection(state.memory.short_term().len())
}

fn long_term(state: &EntityState) -> Attribute {
    Attribute::Collection(state.memory.long_term().len())
}

fn archeological(state: &EntityState) -> Attribute {
    Attribute::Collection(state.memory.archeological().len())
}

const ACCESSORS: &[(&str, Accessor<EntityState>)] = &[
    ("resonance_factor", resonance_factor),
    ("truth_pulse", truth_pulse),
    ("internal_time", internal_time),
    ("udp_core.temporal_flux", temporal_flux),
    ("udp_core.mass_echo", mass_echo),
    ("udp_core.energy_resonance", energy_resonance),
    ("contradictions", contradictions),
    ("variables", variables),
    ("shadow_traces", shadow_traces),
    ("children", children),
    ("ontology_graph.nodes", graph_nodes),
    ("ontology_graph.edges", graph_edges),
    ("memory.short_term", short_term),
    ("memory.long_term", long_term),
    ("memory.archeological", archeological),
];

impl StateView for EntityState {
    fn resolve(&self, path: &str) -> Option<Attribute> {
        resolve_in(ACCESSORS, self, path)
    }
}
