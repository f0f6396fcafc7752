//! Truth-pulse rule engine for the tau entity runtime.
//!
//! A rule set is data, not code: each rule names an attribute path and a
//! predicate, and is loaded from a JSON document at engine construction.
//! The engine scores any [`StateView`] against the set, two points per met
//! rule, clamped to the `0..=10` range.
//!
//! # Modules
//!
//! - [`error`] -- [`RuleError`] for load and validation failures
//! - [`rules`] -- [`RuleSet`], [`RuleDescriptor`], [`Predicate`] and the built-in defaults
//! - [`view`] -- The [`StateView`] seam and [`Attribute`] values it resolves to
//! - [`rule_engine`] -- [`RuleEngine`] and its per-rule [`Scorecard`]

pub mod error;
pub mod rule_engine;
pub mod rules;
pub mod view;

pub use error::RuleError;
pub use rule_engine::{MAX_SCORE, POINTS_PER_RULE, RuleEngine, RuleOutcome, RuleStatus, Scorecard};
pub use rules::{Predicate, RuleDescriptor, RuleSet};
pub use view::{Accessor, Attribute, FlagRecord, StateView, resolve_in};
