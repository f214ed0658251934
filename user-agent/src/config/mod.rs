//! Public API for configuration

pub mod loader;
pub mod model;

// Re-export the main entrypoints:
pub use loader::{load, parse};
pub use model::{ClientConfig, Config, ConfigError, FaultPlan, HostConfig, LoggingConfig};
