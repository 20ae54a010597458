//! Configuration data models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the kizuna archive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KizunaConfig {
    pub graph: GraphConfig,
    pub archive: ArchiveConfig,
    pub logging: LoggingConfig,
}

/// Settings governing family-graph commands and traversals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum depth for ancestry traversals, including the acyclicity walk
    /// performed before registering a parent edge. The walk fails closed with
    /// `DepthExceeded` rather than doing unbounded work.
    pub max_traversal_depth: usize,

    /// Maximum number of entries allowed in an entity's extension map.
    pub max_extension_entries: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_traversal_depth: 64,
            max_extension_entries: 32,
        }
    }
}

/// Settings for the archive service and its external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Timeout for a single content-store call.
    #[serde(with = "humantime_serde")]
    pub store_timeout: Duration,

    /// Timeout for a single ledger anchor call. A timeout here never rolls
    /// back an already-pushed blob; the commit resumes from "push succeeded,
    /// anchor pending" on retry.
    #[serde(with = "humantime_serde")]
    pub anchor_timeout: Duration,

    /// What to do when committing content identical to the latest anchor.
    pub reanchor: ReanchorPolicy,

    pub retry: RetryConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(10),
            anchor_timeout: Duration::from_secs(30),
            reanchor: ReanchorPolicy::Skip,
            retry: RetryConfig::default(),
        }
    }
}

/// Policy for a commit whose content id matches the latest anchored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReanchorPolicy {
    /// Full no-op: return the existing receipt, write nothing anywhere.
    Skip,
    /// Anchor again for a fresh receipt; the content push stays skipped.
    Always,
}

/// Bounded exponential backoff for transient store/ledger failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    #[serde(with = "humantime_serde")]
    pub initial_backoff: Duration,

    /// Backoff multiplier applied after each failed attempt.
    pub backoff_multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
            backoff_multiplier: 2,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Emit to stdout.
    pub stdout: bool,
    /// Optional log file; written through a non-blocking appender.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            stdout: true,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}
