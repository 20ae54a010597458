//! Configuration builder.

use super::{
    KizunaConfig, LogFormat, LogLevel, ReanchorPolicy, Result, validation,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder-pattern API for creating [`KizunaConfig`] values in code.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: KizunaConfig,
}

impl ConfigBuilder {
    /// Start from crate defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap for ancestry traversals and the acyclicity walk.
    pub fn with_max_traversal_depth(mut self, depth: usize) -> Self {
        self.config.graph.max_traversal_depth = depth;
        self
    }

    /// Cap for extension-map entries per entity.
    pub fn with_max_extension_entries(mut self, entries: usize) -> Self {
        self.config.graph.max_extension_entries = entries;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.config.archive.store_timeout = timeout;
        self
    }

    pub fn with_anchor_timeout(mut self, timeout: Duration) -> Self {
        self.config.archive.anchor_timeout = timeout;
        self
    }

    pub fn with_reanchor_policy(mut self, policy: ReanchorPolicy) -> Self {
        self.config.archive.reanchor = policy;
        self
    }

    /// Bound the retry loop used by `commit_with_retry`.
    pub fn with_retry(mut self, max_attempts: u32, initial_backoff: Duration) -> Self {
        self.config.archive.retry.max_attempts = max_attempts;
        self.config.archive.retry.initial_backoff = initial_backoff;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(PathBuf::from(path.as_ref()));
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<KizunaConfig> {
        validation::validate(&self.config)?;
        Ok(self.config)
    }
}
