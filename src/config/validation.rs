//! Configuration validation.

use super::{ConfigError, KizunaConfig, Result};
use std::time::Duration;

/// Hard upper bound on traversal depth; anything larger is a misconfiguration.
const MAX_TRAVERSAL_DEPTH_CEILING: usize = 1024;

/// Validate a merged configuration before use.
pub fn validate(config: &KizunaConfig) -> Result<()> {
    let graph = &config.graph;
    if graph.max_traversal_depth == 0 {
        return Err(ConfigError::ValidationError(
            "graph.max_traversal_depth must be at least 1".to_string(),
        ));
    }
    if graph.max_traversal_depth > MAX_TRAVERSAL_DEPTH_CEILING {
        return Err(ConfigError::ValidationError(format!(
            "graph.max_traversal_depth must not exceed {MAX_TRAVERSAL_DEPTH_CEILING}"
        )));
    }
    if graph.max_extension_entries == 0 {
        return Err(ConfigError::ValidationError(
            "graph.max_extension_entries must be at least 1".to_string(),
        ));
    }

    let archive = &config.archive;
    if archive.store_timeout == Duration::ZERO {
        return Err(ConfigError::ValidationError(
            "archive.store_timeout must be non-zero".to_string(),
        ));
    }
    if archive.anchor_timeout == Duration::ZERO {
        return Err(ConfigError::ValidationError(
            "archive.anchor_timeout must be non-zero".to_string(),
        ));
    }

    let retry = &archive.retry;
    if retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "archive.retry.max_attempts must be at least 1".to_string(),
        ));
    }
    if retry.initial_backoff == Duration::ZERO {
        return Err(ConfigError::ValidationError(
            "archive.retry.initial_backoff must be non-zero".to_string(),
        ));
    }
    if retry.backoff_multiplier == 0 {
        return Err(ConfigError::ValidationError(
            "archive.retry.backoff_multiplier must be at least 1".to_string(),
        ));
    }

    Ok(())
}
