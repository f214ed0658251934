// src/main.rs

//! Harness entry-point.
//!
//! 1. Parse configuration & set up structured logging
//! 2. Boot the simulated host and load the driver into it
//! 3. Run the configured client sessions against `/dev/driver_demo`
//! 4. Unload and report
//!
//! Usage: `demo-agent [config.toml]` (defaults to `default.toml` next to the
//! executable).

// ───── std / 3rd-party imports ──────────────────────────────────────────────
use anyhow::Context;
use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use std::{
    path::{Path, PathBuf},
    process, thread,
};

// ───── local imports ────────────────────────────────────────────────────────
use agent::client;
use agent::config::{self, Config, LoggingConfig};

// ───── helpers ──────────────────────────────────────────────────────────────

/// Print an error with context and terminate the process.
macro_rules! fatal {
    ($ctx:expr, $($arg:tt)+) => {{
        eprintln!(
            "[{}][ERROR][{}] {}",
            chrono::Local::now().to_rfc3339(),
            $ctx,
            format!($($arg)+)
        );
        std::process::exit(1);
    }};
}

/// Directory that contains the running executable.
fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// First CLI argument, or `default.toml` next to the executable.
fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| exe_dir().join("default.toml"))
}

/// Missing file means defaults; anything else wrong with it is fatal.
fn load_cfg(path: &Path) -> Config {
    if !path.exists() {
        eprintln!(
            "[{}][WARN][config] {} not found, using defaults",
            Local::now().to_rfc3339(),
            path.display()
        );
        return config::parse("").unwrap_or_else(|e| fatal!("config", "{}", e));
    }
    config::load(path).unwrap_or_else(|e| fatal!("config", "{}", e))
}

fn level_filter(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "ERROR" => LevelFilter::Error,
        "WARN" => LevelFilter::Warn,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Configure global logging as requested in `[logging]`.
fn setup_logging(base: &Path, logging: &LoggingConfig) -> Result<(), fern::InitError> {
    let log_path = logging
        .enable
        .then(|| base.join(logging.file.as_deref().unwrap_or("demo-agent.log")));

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                thread::current().id(),
                msg
            ))
        })
        .level(level_filter(&logging.level))
        .chain(std::io::stdout());

    if let Some(path) = log_path {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

// ───── harness logic ────────────────────────────────────────────────────────

fn run(cfg: &Config) -> anyhow::Result<()> {
    let report = client::run(cfg).context("demo run failed")?;
    log::info!("driver ran at major {}", report.major);
    for (i, session) in report.sessions.iter().enumerate() {
        log::info!(
            "session {}: reads {:?} -> \"{}\", wrote {} bytes",
            i,
            session.reads,
            session.data.escape_ascii(),
            session.written
        );
    }
    log::info!("no device node left behind");
    Ok(())
}

fn main() {
    let path = config_path();
    let cfg = load_cfg(&path);

    let base = path.parent().map(Path::to_path_buf).unwrap_or_else(exe_dir);
    setup_logging(&base, &cfg.logging).unwrap_or_else(|e| fatal!("logging", "{}", e));
    log::info!("harness starting with {}", path.display());

    if let Err(e) = run(&cfg) {
        fatal!("main", "{:#}", e);
    }
}
