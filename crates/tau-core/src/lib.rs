//! Concurrent runtime for tau entities.
//!
//! Each entity runs on its own tokio task and talks to the outside world
//! through a non-blocking [`Inbox`]. The runtime shares one rule engine and
//! one cadence across a root entity and every child it spawns.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration ([`TauConfig`])
//! - [`inbox`] -- Thread-safe FIFO event queue
//! - [`lifecycle`] -- `Created -> Running -> Stopping -> Stopped`
//! - [`runner`] -- [`EntityHandle`] and the entity loop
//! - [`error`] -- Runtime setup errors

pub mod config;
pub mod error;
pub mod inbox;
pub mod lifecycle;
pub mod runner;

pub use config::{ConfigError, DemoConfig, RuntimeConfig, TauConfig};
pub use error::RuntimeError;
pub use inbox::Inbox;
pub use lifecycle::Lifecycle;
pub use runner::{EntityHandle, Runtime};
