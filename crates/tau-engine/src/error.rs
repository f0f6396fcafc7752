//! Error types for the orchestrator binary.

/// Top-level error for the orchestrator.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tau_core::ConfigError,
    },

    /// Runtime setup (rule document) failed.
    #[error("runtime error: {source}")]
    Runtime {
        /// The underlying runtime error.
        #[from]
        source: tau_core::RuntimeError,
    },

    /// A scripted direct call was refused.
    #[error("script step rejected: {source}")]
    Rejected {
        /// The handler's rejection.
        #[from]
        source: tau_entity::Rejection,
    },

    /// A transmission could not be rendered.
    #[error("failed to render transmission: {source}")]
    Render {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
