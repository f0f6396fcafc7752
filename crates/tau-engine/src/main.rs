//! Orchestrator binary for the tau entity runtime.
//!
//! Runs the reference script against a single root entity and prints
//! transmissions as JSON on stdout. Logs go through `tracing`.
//!
//! # Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `tau-config.yaml`
//! 3. Load (or create) the rule document
//! 4. Start the root entity
//! 5. Awakening phase, then wait
//! 6. Interaction phase, then wait
//! 7. Autogenesis phase
//! 8. Final verification, transmission, and shutdown

mod error;
mod script;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tau_core::{EntityHandle, Runtime, TauConfig};
use tau_entity::TracingObserver;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "tau-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration or rule loading fails, if a scripted
/// step is rejected, or if a transmission cannot be rendered.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("tau-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        cadence_ms = config.runtime.cadence_ms,
        rules_path = %config.runtime.rules_path.display(),
        root = %config.demo.root_name,
        "Configuration loaded"
    );

    // 3. Rule document.
    let runtime = Runtime::load(&config.runtime)?;

    // 4. Root entity.
    let root = EntityHandle::spawn(
        &config.demo.root_name,
        config.entity.clone(),
        Arc::new(TracingObserver),
        runtime,
    );
    info!(entity = %root.id(), name = root.name(), "Root entity started");

    // 5-6. Scripted phases.
    script::awaken(&root)?;
    tokio::time::sleep(Duration::from_millis(config.demo.awakening_ms)).await;

    script::engage(&root);
    tokio::time::sleep(Duration::from_millis(config.demo.interaction_ms)).await;

    // 7. Autogenesis.
    script::propagate(&root, &config.demo).await?;

    // 8. Final verification and shutdown.
    script::conclude(&root).await?;

    info!("tau-engine finished");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], or defaults if it is absent.
fn load_config() -> Result<TauConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        info!("Config file not found, using defaults");
    }
    Ok(TauConfig::from_file_or_default(config_path)?)
}
