//! Runtime configuration loaded from `tau-config.yaml`.
//!
//! Every section and field has a default, so an empty document (or none
//! at all) is a valid configuration. `TAU_RULES_PATH` overrides the rule
//! document location after parsing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tau_entity::EntityConfig;

/// Environment variable overriding [`RuntimeConfig::rules_path`].
pub const RULES_PATH_ENV: &str = "TAU_RULES_PATH";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TauConfig {
    /// Loop cadence and rule document location.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Behavior of every entity (children inherit their parent's).
    #[serde(default)]
    pub entity: EntityConfig,

    /// Timings for the orchestrator's scripted run.
    #[serde(default)]
    pub demo: DemoConfig,
}

impl TauConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`TauConfig::from_file`], except that a missing file is not
    /// an error.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.runtime.apply_env_overrides();
                Ok(config)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.runtime.apply_env_overrides();
        Ok(config)
    }
}

/// Loop and rule settings shared by every entity in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Idle time between loop iterations in milliseconds (default: 1000).
    pub cadence_ms: u64,

    /// Path of the rule document (default: `truth_rules.json`).
    pub rules_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cadence_ms: 1000,
            rules_path: PathBuf::from("truth_rules.json"),
        }
    }
}

impl RuntimeConfig {
    /// Loop cadence as a [`Duration`].
    pub const fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(RULES_PATH_ENV)
            && !path.is_empty()
        {
            self.rules_path = PathBuf::from(path);
        }
    }
}

/// Timings and names for the orchestrator's scripted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Name of the root entity (default: `TauPrime`).
    pub root_name: String,

    /// Wait after the awakening phase in milliseconds (default: 7000).
    pub awakening_ms: u64,

    /// Wait after the interaction phase in milliseconds (default: 8000).
    pub interaction_ms: u64,

    /// How long a spawned child runs before transmitting (default: 5000).
    pub child_run_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            root_name: String::from("TauPrime"),
            awakening_ms: 7000,
            interaction_ms: 8000,
            child_run_ms: 5000,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = TauConfig::parse("").unwrap();
        assert_eq!(config.runtime.cadence_ms, 1000);
        assert_eq!(config.entity, EntityConfig::default());
        assert_eq!(config.demo.root_name, "TauPrime");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let yaml = r"
runtime:
  cadence_ms: 25
entity:
  reflection_probability: 0.5
  autogenesis:
    min_nodes: 2
demo:
  child_run_ms: 10
";
        let config = TauConfig::parse(yaml).unwrap();
        assert_eq!(config.runtime.cadence(), Duration::from_millis(25));
        assert!((config.entity.reflection_probability - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.entity.short_term_capacity, 20);
        assert_eq!(config.entity.autogenesis.min_nodes, 2);
        assert_eq!(config.entity.autogenesis.min_edges, 2);
        assert_eq!(config.demo.child_run_ms, 10);
        assert_eq!(config.demo.awakening_ms, 7000);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = TauConfig::parse("runtime: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("tau-config-that-does-not-exist.yaml");
        assert!(matches!(
            TauConfig::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
        assert!(TauConfig::from_file_or_default(&path).is_ok());
    }
}
