//! The truth-pulse rule engine.
//!
//! The engine is constructed once from an external JSON rule document. A
//! missing document is not an error: the built-in defaults are used and
//! written back to the same path so the next run (and the operator) can
//! find and edit them. A document that exists but does not parse is fatal
//! at construction.
//!
//! Scoring is a pure function of the view and the rule set. Nothing is
//! cached between calls.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::error::RuleError;
use crate::rules::{Predicate, RuleDescriptor, RuleSet};
use crate::view::{Attribute, StateView};

/// Points contributed by each met rule.
pub const POINTS_PER_RULE: u8 = 2;

/// Upper bound of the truth pulse.
pub const MAX_SCORE: u8 = 10;

// ---------------------------------------------------------------------------
// Scorecard
// ---------------------------------------------------------------------------

/// Outcome of a single rule against a single view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStatus {
    /// The predicate held.
    Met,
    /// The path resolved but the predicate did not hold.
    NotMet,
    /// The path could not be resolved; the rule was skipped.
    Unresolved,
}

/// A named rule outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Rule name.
    pub name: String,
    /// What happened.
    pub status: RuleStatus,
}

/// Full result of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    /// The truth pulse, `0..=MAX_SCORE`.
    pub score: u8,
    /// One outcome per rule, in rule-name order.
    pub outcomes: Vec<RuleOutcome>,
}

impl Scorecard {
    /// Number of rules that were met.
    pub fn met(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == RuleStatus::Met)
            .count()
    }
}

// ---------------------------------------------------------------------------
// RuleEngine
// ---------------------------------------------------------------------------

/// Scores state views against a configurable rule set.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: RuleSet,
    source: Option<PathBuf>,
}

impl RuleEngine {
    /// Load the rule document at `path`.
    ///
    /// If the file does not exist, the built-in defaults are used and
    /// persisted to `path`. Failing to persist them is logged, not fatal.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Io`] if the file exists but cannot be read, and
    /// [`RuleError::Parse`] if its content is not a valid rule document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let rules = match std::fs::read_to_string(path) {
            Ok(contents) => {
                let rules: RuleSet =
                    serde_json::from_str(&contents).map_err(|source| RuleError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?;
                info!(path = %path.display(), rules = rules.len(), "Rules loaded");
                rules
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "Rule document not found, using built-in defaults"
                );
                let rules = RuleSet::defaults();
                persist(path, &rules);
                rules
            }
            Err(source) => {
                return Err(RuleError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(Self {
            rules,
            source: Some(path.to_path_buf()),
        })
    }

    /// Engine over an in-memory rule set. Nothing is read or written.
    pub const fn from_rules(rules: RuleSet) -> Self {
        Self {
            rules,
            source: None,
        }
    }

    /// Engine over the built-in defaults. Nothing is read or written.
    pub fn with_defaults() -> Self {
        Self::from_rules(RuleSet::defaults())
    }

    /// The active rule set.
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Path the rules were loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Score `view`, returning only the truth pulse.
    pub fn verify<V: StateView + ?Sized>(&self, view: &V) -> u8 {
        self.evaluate(view).score
    }

    /// Score `view`, returning every rule's outcome alongside the score.
    pub fn evaluate<V: StateView + ?Sized>(&self, view: &V) -> Scorecard {
        let outcomes: Vec<RuleOutcome> = self
            .rules
            .iter()
            .map(|(name, rule)| {
                let status = check(name, rule, view);
                RuleOutcome {
                    name: String::from(name),
                    status,
                }
            })
            .collect();

        let met = outcomes
            .iter()
            .filter(|o| o.status == RuleStatus::Met)
            .count();
        let score = u8::try_from(met)
            .unwrap_or(u8::MAX)
            .saturating_mul(POINTS_PER_RULE)
            .min(MAX_SCORE);

        Scorecard { score, outcomes }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Whether `n` elements satisfy a (possibly fractional) minimum count.
#[allow(clippy::cast_precision_loss)]
fn at_least(n: usize, count: f64) -> bool {
    n as f64 >= count
}

/// Evaluate one rule against the view.
fn check<V: StateView + ?Sized>(name: &str, rule: &RuleDescriptor, view: &V) -> RuleStatus {
    let Some(value) = view.resolve(&rule.attribute) else {
        warn!(
            rule = name,
            attribute = %rule.attribute,
            "Could not resolve attribute path, skipping rule"
        );
        return RuleStatus::Unresolved;
    };

    let met = match &rule.predicate {
        Predicate::MinValue(threshold) => {
            matches!(value, Attribute::Number(n) if n >= *threshold)
        }
        Predicate::MinCount {
            count,
            filter: Some(flag),
        } => value.count_flagged(flag).is_some_and(|n| at_least(n, *count)),
        Predicate::MinCount {
            count,
            filter: None,
        } => value.len().is_some_and(|n| at_least(n, *count)),
    };

    if met {
        debug!(rule = name, "Rule met");
        RuleStatus::Met
    } else {
        debug!(rule = name, "Rule not met");
        RuleStatus::NotMet
    }
}

/// Write `rules` to `path` as pretty JSON. Failures are logged only.
fn persist(path: &Path, rules: &RuleSet) {
    let contents = match serde_json::to_string_pretty(rules) {
        Ok(contents) => contents,
        Err(err) => {
            error!(error = %err, "Could not serialize default rules");
            return;
        }
    };
    match std::fs::write(path, contents) {
        Ok(()) => info!(path = %path.display(), "Default rules saved"),
        Err(err) => error!(path = %path.display(), error = %err, "Could not save default rules"),
    }
}
