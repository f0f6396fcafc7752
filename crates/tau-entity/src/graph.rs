//! Directed, labeled concept graph.
//!
//! Nodes are unique concept names carrying a free-form attribute map;
//! edges are `(from, relation, to)` triples kept in insertion order, with
//! duplicates allowed. An edge can only be added between concepts that
//! already exist, so the graph never contains implicit nodes.
//!
//! A graph is shared between a parent entity and every child it spawns,
//! and each of them mutates it from its own loop. All operations therefore
//! take `&self` and synchronize through an internal [`RwLock`].

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphError;

/// Free-form concept attributes (`metaphor`, `emotion`, `created_at`, ...).
pub type ConceptAttributes = Map<String, Value>;

/// A directed, labeled edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Source concept.
    pub from: String,
    /// Relation label.
    pub relation: String,
    /// Target concept.
    pub to: String,
}

#[derive(Debug, Default)]
struct GraphInner {
    nodes: BTreeMap<String, ConceptAttributes>,
    edges: Vec<Relation>,
}

/// Thread-safe concept graph.
#[derive(Debug, Default)]
pub struct ConceptGraph {
    inner: RwLock<GraphInner>,
}

impl ConceptGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, GraphInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GraphInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a concept. First writer wins: an existing concept is left
    /// untouched. Returns `true` if the concept was inserted.
    pub fn add_concept(&self, name: &str, attributes: Option<ConceptAttributes>) -> bool {
        let mut inner = self.write();
        if inner.nodes.contains_key(name) {
            return false;
        }
        inner
            .nodes
            .insert(String::from(name), attributes.unwrap_or_default());
        true
    }

    /// Append an edge between two existing concepts.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingConcept`] if either endpoint is absent;
    /// the graph is unchanged in that case.
    pub fn add_relation(&self, from: &str, relation: &str, to: &str) -> Result<(), GraphError> {
        let mut inner = self.write();
        let missing = [from, to]
            .into_iter()
            .find(|name| !inner.nodes.contains_key(*name));
        if let Some(missing) = missing {
            return Err(GraphError::MissingConcept {
                from: String::from(from),
                relation: String::from(relation),
                to: String::from(to),
                missing: String::from(missing),
            });
        }
        inner.edges.push(Relation {
            from: String::from(from),
            relation: String::from(relation),
            to: String::from(to),
        });
        Ok(())
    }

    /// Targets of edges leaving `name`, optionally restricted to one
    /// relation label, in edge insertion order.
    pub fn related_to(&self, name: &str, relation: Option<&str>) -> Vec<String> {
        self.read()
            .edges
            .iter()
            .filter(|edge| edge.from == name && relation.is_none_or(|r| edge.relation == r))
            .map(|edge| edge.to.clone())
            .collect()
    }

    /// Whether a concept exists.
    pub fn contains(&self, name: &str) -> bool {
        self.read().nodes.contains_key(name)
    }

    /// A copy of a concept's attributes.
    pub fn concept(&self, name: &str) -> Option<ConceptAttributes> {
        self.read().nodes.get(name).cloned()
    }

    /// Concept names in sorted order.
    pub fn concept_names(&self) -> Vec<String> {
        self.read().nodes.keys().cloned().collect()
    }

    /// A copy of every edge, in insertion order.
    pub fn relations(&self) -> Vec<Relation> {
        self.read().edges.clone()
    }

    /// Concept name to its `metaphor` attribute, for concepts that have one.
    pub fn metaphors(&self) -> BTreeMap<String, String> {
        self.read()
            .nodes
            .iter()
            .filter_map(|(name, attrs)| {
                attrs
                    .get("metaphor")
                    .and_then(Value::as_str)
                    .map(|m| (name.clone(), String::from(m)))
            })
            .collect()
    }

    /// Number of concepts.
    pub fn node_count(&self) -> usize {
        self.read().nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.read().edges.len()
    }
}
