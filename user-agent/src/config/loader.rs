// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads `default.toml`, deserializes into `ConfigFile`, and
//! converts the raw tables into a validated runtime `Config`.

use crate::config::model::{Config, ConfigError, ConfigFile, FaultPlan, HostConfig, HostStub};
use demo_driver::Errno;
use log::Level;
use std::{fs, path::Path};

/// Load and parse the configuration from `path`.
/// Logs at DEBUG before reading and INFO on success.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    agent_log!(Level::Debug, "config", "Reading config from {:?}", path);
    let txt = fs::read_to_string(path)?;
    let cfg = parse(&txt)?;
    agent_log!(Level::Info, "config", "Loaded config from {:?}", path);
    Ok(cfg)
}

/// Parse and validate TOML text. Missing tables take their defaults.
pub fn parse(txt: &str) -> Result<Config, ConfigError> {
    let raw: ConfigFile = toml::from_str(txt)?;
    if raw.client.read_chunk == 0 {
        return Err(ConfigError::ZeroReadChunk);
    }
    Ok(Config {
        logging: raw.logging,
        host:    convert_host(raw.host)?,
        client:  raw.client,
    })
}

/// Convert the `[host]` stub into its typed form.
pub fn convert_host(stub: HostStub) -> Result<HostConfig, ConfigError> {
    if !(1..=254).contains(&stub.dynamic_majors) {
        return Err(ConfigError::InvalidMajorRange(stub.dynamic_majors));
    }
    let faults = FaultPlan {
        identifier: errno("fail_identifier", stub.fail_identifier)?,
        class:      errno("fail_class", stub.fail_class)?,
        node:       errno("fail_node", stub.fail_node)?,
        release:    stub.fail_release,
    };
    agent_log!(
        Level::Debug,
        "config",
        "Host: {} dynamic majors, faults={:?}",
        stub.dynamic_majors,
        faults
    );
    Ok(HostConfig { dynamic_majors: stub.dynamic_majors, faults })
}

fn errno(key: &'static str, name: Option<String>) -> Result<Option<Errno>, ConfigError> {
    name.map(|n| Errno::from_name(&n).ok_or(ConfigError::InvalidErrno(key, n)))
        .transpose()
}
