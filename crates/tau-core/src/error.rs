//! Error types for runtime setup.
//!
//! Everything here is a construction-time failure. Once an entity is
//! running, nothing it does can produce a [`RuntimeError`].

use tau_rules::RuleError;

use crate::config::ConfigError;

/// Failures while preparing the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The runtime configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The rule document exists but could not be read or parsed.
    #[error("rule engine error: {0}")]
    Rules(#[from] RuleError),
}
