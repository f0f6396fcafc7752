//! Error types for rule loading.
//!
//! Only construction can fail. Once an engine exists, scoring never errors:
//! unresolvable paths are skipped rule by rule.

use std::path::PathBuf;

/// Errors that can occur while loading or validating a rule document.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rule document exists but could not be read.
    #[error("failed to read rule document {path}: {source}")]
    Io {
        /// Path of the rule document.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The rule document is not valid JSON, or does not match the rule schema.
    #[error("malformed rule document {path}: {source}")]
    Parse {
        /// Path of the rule document.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A single rule has an invalid predicate.
    #[error("invalid rule '{name}' on '{attribute}': {reason}")]
    InvalidRule {
        /// Key of the offending rule in the document.
        name: String,
        /// Attribute path the rule targets.
        attribute: String,
        /// Why the rule was rejected.
        reason: String,
    },
}
