//! Structured logging for kizuna, built on the tracing crate.
//!
//! Supports pretty, compact, and JSON output to stdout or a non-blocking
//! log file, selected through [`LoggingConfig`]. The configured level is the
//! default filter; a `RUST_LOG` environment variable overrides it with full
//! per-target directives.

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking file writer's flush thread alive for the process
/// lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("subscriber setup failed: {0}")]
    Subscriber(String),
}

/// Result type for logging operations.
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the global tracing subscriber from configuration.
///
/// Calling this twice is tolerated: an already-installed subscriber is left
/// in place and `Ok` is returned.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = match config.level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    };

    let result = match config.format {
        LogFormat::Json => init_json(level, config),
        LogFormat::Compact => init_compact(level, config),
        LogFormat::Pretty => init_pretty(level, config),
    };

    match result {
        Err(LogError::Subscriber(msg)) if msg.contains("already") => Ok(()),
        other => other,
    }
}

/// `RUST_LOG` when set, otherwise the configured level.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

fn init_json(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(level))
        .with_level(true)
        .with_target(true);

    if let Some(path) = &config.file {
        let writer = non_blocking_file(path)?;
        subscriber
            .with_writer(writer)
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    } else {
        subscriber
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    }
}

fn init_compact(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter(level))
        .with_level(true)
        .with_target(true);

    if let Some(path) = &config.file {
        let writer = non_blocking_file(path)?;
        subscriber
            .with_writer(writer)
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    } else {
        subscriber
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    }
}

fn init_pretty(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_level(true)
        .with_target(true);

    if let Some(path) = &config.file {
        let writer = non_blocking_file(path)?;
        subscriber
            .with_writer(writer)
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    } else {
        subscriber
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    }
}

fn non_blocking_file(path: &Path) -> Result<NonBlocking> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}
