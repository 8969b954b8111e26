//! Logging setup.
//!
//! Logs go to a daily rolling file under `$TRAVORAMA_HOME/logs` so the
//! full-screen UI never has its frame overwritten by log lines.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

/// Environment variable holding an `EnvFilter` directive (e.g. `debug`).
pub const LOG_ENV: &str = "TRAVORAMA_LOG";

const LOG_FILE_PREFIX: &str = "travorama.log";

/// Initializes tracing with the default log directory.
///
/// Keep the returned guard alive for the lifetime of the process; dropping it
/// flushes and stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created or tracing was
/// already initialized.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    init_in(&paths::logs_dir(), config)
}

/// Initializes tracing writing into `dir`.
///
/// # Errors
/// Returns an error if the log directory cannot be created or tracing was
/// already initialized.
pub fn init_in(dir: &Path, config: &Config) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_level))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("tracing already initialized: {err}"))?;

    Ok(guard)
}

fn env_filter(fallback_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = fallback_level.trim();
        if level.is_empty() {
            EnvFilter::new(Config::DEFAULT_LOG_LEVEL)
        } else {
            EnvFilter::new(level)
        }
    })
}
