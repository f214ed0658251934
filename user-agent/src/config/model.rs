// src/config/model.rs

use demo_driver::Errno;
use serde::Deserialize;
use thiserror::Error;

/// Top-level runtime config
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub host:    HostConfig,
    pub client:  ClientConfig,
}

/// Raw file layout; every table is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)] pub logging: LoggingConfig,
    #[serde(default)] pub host:    HostStub,
    #[serde(default)] pub client:  ClientConfig,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]                   pub enable: bool,
    #[serde(default)]                   pub file:   Option<String>,
    #[serde(default = "default_level")] pub level:  String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

/// Mirror of the `[host]` table: errno names are still strings here
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostStub {
    #[serde(default = "default_dynamic_majors")] pub dynamic_majors:  u32,
    #[serde(default)]                            pub fail_identifier: Option<String>,
    #[serde(default)]                            pub fail_class:      Option<String>,
    #[serde(default)]                            pub fail_node:       Option<String>,
    #[serde(default)]                            pub fail_release:    bool,
}
fn default_dynamic_majors() -> u32 { 21 }

impl Default for HostStub {
    fn default() -> Self {
        Self {
            dynamic_majors:  default_dynamic_majors(),
            fail_identifier: None,
            fail_class:      None,
            fail_node:       None,
            fail_release:    false,
        }
    }
}

/// Fully-typed `[host]` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Size of the dynamic major range, counted down from 254.
    pub dynamic_majors: u32,
    pub faults:         FaultPlan,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { dynamic_majors: default_dynamic_majors(), faults: FaultPlan::default() }
    }
}

/// Which host calls should fail, and with what
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    pub identifier: Option<Errno>,
    pub class:      Option<Errno>,
    pub node:       Option<Errno>,
    /// Every release call reports `EBUSY` (after releasing).
    pub release:    bool,
}

/// Mirror of the `[client]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_read_chunk")]    pub read_chunk:    usize,
    #[serde(default = "default_write_payload")] pub write_payload: String,
    #[serde(default = "default_sessions")]      pub sessions:      usize,
}
fn default_read_chunk() -> usize { 8 }
fn default_write_payload() -> String { "ping".into() }
fn default_sessions() -> usize { 1 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_chunk:    default_read_chunk(),
            write_payload: default_write_payload(),
            sessions:      default_sessions(),
        }
    }
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown errno name '{1}' for host.{0}")]
    InvalidErrno(&'static str, String),

    #[error("client.read_chunk must be at least 1")]
    ZeroReadChunk,

    #[error("host.dynamic_majors must be between 1 and 254, got {0}")]
    InvalidMajorRange(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
