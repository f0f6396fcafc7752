//! Rule descriptors and the built-in default rule set.
//!
//! On disk a rule set is a JSON object mapping rule name to a descriptor:
//!
//! ```json
//! {
//!   "shadow_honored": {
//!     "attribute": "shadow_traces",
//!     "min_count": 1,
//!     "filter": "honored",
//!     "description": "At least one lost potential has been honored."
//!   }
//! }
//! ```
//!
//! Each descriptor carries exactly one of `min_value` or `min_count`
//! (`filter` is only meaningful alongside `min_count`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Predicate a resolved attribute must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Met iff the attribute is numeric and `>=` the threshold.
    MinValue(f64),
    /// Met iff the attribute is a sized collection with at least `count`
    /// elements, or, with a `filter`, a sequence of records with at least
    /// `count` elements whose `filter` flag is true.
    MinCount {
        /// Minimum number of (matching) elements. Finite and non-negative;
        /// fractional thresholds round up in effect.
        count: f64,
        /// Optional boolean field each element must have set.
        filter: Option<String>,
    },
}

/// A single named rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDescriptor {
    /// Dotted attribute path, e.g. `ontology_graph.nodes`.
    pub attribute: String,
    /// What the attribute must satisfy.
    pub predicate: Predicate,
    /// Human-readable explanation.
    pub description: String,
}

impl RuleDescriptor {
    /// Rule requiring a numeric attribute of at least `threshold`.
    pub fn min_value(attribute: &str, threshold: f64, description: &str) -> Self {
        Self {
            attribute: String::from(attribute),
            predicate: Predicate::MinValue(threshold),
            description: String::from(description),
        }
    }

    /// Rule requiring a collection attribute of at least `count` elements,
    /// optionally counting only elements whose `filter` flag is set.
    pub fn min_count(attribute: &str, count: u32, filter: Option<&str>, description: &str) -> Self {
        Self {
            attribute: String::from(attribute),
            predicate: Predicate::MinCount {
                count: f64::from(count),
                filter: filter.map(String::from),
            },
            description: String::from(description),
        }
    }

    /// Validate the wire form of the rule called `name`.
    fn from_raw(name: &str, raw: RawRule) -> Result<Self, RuleError> {
        let invalid = |reason: &str| RuleError::InvalidRule {
            name: String::from(name),
            attribute: raw.attribute.clone(),
            reason: String::from(reason),
        };
        let predicate = match (raw.min_value, raw.min_count) {
            (Some(_), None) if raw.filter.is_some() => {
                return Err(invalid("filter is only valid with min_count"));
            }
            (Some(threshold), None) => Predicate::MinValue(threshold),
            (None, Some(count)) if !count.is_finite() || count < 0.0 => {
                return Err(invalid("min_count must be a finite, non-negative number"));
            }
            (None, Some(count)) => Predicate::MinCount {
                count,
                filter: raw.filter,
            },
            (Some(_), Some(_)) => return Err(invalid("both min_value and min_count given")),
            (None, None) => return Err(invalid("one of min_value or min_count is required")),
        };
        Ok(Self {
            attribute: raw.attribute,
            predicate,
            description: raw.description,
        })
    }
}

/// Wire form of a rule descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRule {
    attribute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    #[serde(default)]
    description: String,
}

impl From<RuleDescriptor> for RawRule {
    fn from(rule: RuleDescriptor) -> Self {
        let (min_value, min_count, filter) = match rule.predicate {
            Predicate::MinValue(threshold) => (Some(threshold), None, None),
            Predicate::MinCount { count, filter } => (None, Some(count), filter),
        };
        Self {
            attribute: rule.attribute,
            min_value,
            min_count,
            filter,
            description: rule.description,
        }
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Named rules, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, RawRule>",
    into = "BTreeMap<String, RawRule>"
)]
pub struct RuleSet {
    rules: BTreeMap<String, RuleDescriptor>,
}

impl TryFrom<BTreeMap<String, RawRule>> for RuleSet {
    type Error = RuleError;

    fn try_from(raw: BTreeMap<String, RawRule>) -> Result<Self, Self::Error> {
        let rules = raw
            .into_iter()
            .map(|(name, rule)| RuleDescriptor::from_raw(&name, rule).map(|rule| (name, rule)))
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }
}

impl From<RuleSet> for BTreeMap<String, RawRule> {
    fn from(set: RuleSet) -> Self {
        set.rules
            .into_iter()
            .map(|(name, rule)| (name, RawRule::from(rule)))
            .collect()
    }
}

impl RuleSet {
    /// An empty rule set. Every state scores 0 against it.
    pub const fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// The built-in five-rule set, worth exactly 10 points when fully met.
    pub fn defaults() -> Self {
        let mut set = Self::new();
        set.insert(
            "resonance_stable",
            RuleDescriptor::min_value(
                "resonance_factor",
                0.65,
                "Entity's internal resonance is stable.",
            ),
        );
        set.insert(
            "contradictions_named",
            RuleDescriptor::min_count(
                "contradictions",
                1,
                None,
                "At least one contradiction has been integrated.",
            ),
        );
        set.insert(
            "variables_self_aware",
            RuleDescriptor::min_count(
                "variables",
                2,
                None,
                "At least two dual-meaning variables are defined.",
            ),
        );
        set.insert(
            "shadow_honored",
            RuleDescriptor::min_count(
                "shadow_traces",
                1,
                Some("honored"),
                "At least one lost potential has been honored.",
            ),
        );
        set.insert(
            "ontology_rich",
            RuleDescriptor::min_count(
                "ontology_graph.nodes",
                3,
                None,
                "Ontology contains at least three unique concepts.",
            ),
        );
        set
    }

    /// Add or replace a rule.
    pub fn insert(&mut self, name: &str, rule: RuleDescriptor) -> Option<RuleDescriptor> {
        self.rules.insert(String::from(name), rule)
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Option<&RuleDescriptor> {
        self.rules.get(name)
    }

    /// Iterate over `(name, rule)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleDescriptor)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
