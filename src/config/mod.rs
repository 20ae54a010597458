//! Configuration system for kizuna.
//!
//! Configuration loads from multiple sources — defaults, a TOML/JSON file,
//! and `KIZUNA_`-prefixed environment variables — with validation applied
//! after merging.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

/// Default configuration file names the loader looks for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "kizuna.toml",
    "kizuna.json",
    ".kizuna/config.toml",
    ".kizuna/config.json",
];

/// Environment variable prefix for kizuna configuration.
pub const ENV_PREFIX: &str = "KIZUNA_";

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration file: {0}")]
    FileLoadError(String),

    #[error("failed to load environment variables: {0}")]
    EnvLoadError(String),

    #[error("configuration validation error: {0}")]
    ValidationError(String),

    #[error("configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
