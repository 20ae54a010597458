//! Configuration system tests.

use super::*;
use std::io::Write;
use std::time::Duration;

#[test]
fn defaults_are_valid() {
    let config = ConfigBuilder::new().build().unwrap();
    assert_eq!(config.graph.max_traversal_depth, 64);
    assert_eq!(config.archive.reanchor, ReanchorPolicy::Skip);
    assert_eq!(config.archive.retry.max_attempts, 5);
}

#[test]
fn builder_overrides_apply() {
    let config = ConfigBuilder::new()
        .with_max_traversal_depth(8)
        .with_anchor_timeout(Duration::from_secs(5))
        .with_reanchor_policy(ReanchorPolicy::Always)
        .with_retry(2, Duration::from_millis(10))
        .with_log_level(LogLevel::Debug)
        .build()
        .unwrap();

    assert_eq!(config.graph.max_traversal_depth, 8);
    assert_eq!(config.archive.anchor_timeout, Duration::from_secs(5));
    assert_eq!(config.archive.reanchor, ReanchorPolicy::Always);
    assert_eq!(config.archive.retry.max_attempts, 2);
    assert_eq!(config.logging.level, LogLevel::Debug);
}

#[test]
fn zero_depth_is_rejected() {
    let err = ConfigBuilder::new()
        .with_max_traversal_depth(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn zero_retry_attempts_are_rejected() {
    let err = ConfigBuilder::new()
        .with_retry(0, Duration::from_millis(10))
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn loader_reads_toml_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        "[graph]\nmax_traversal_depth = 16\n\n[archive]\nanchor_timeout = \"5s\"\nreanchor = \"always\"\n"
    )
    .unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(file.path()).unwrap();
    let config = loader.build().unwrap();

    assert_eq!(config.graph.max_traversal_depth, 16);
    assert_eq!(config.archive.anchor_timeout, Duration::from_secs(5));
    assert_eq!(config.archive.reanchor, ReanchorPolicy::Always);
    // Untouched sections keep their defaults.
    assert_eq!(config.graph.max_extension_entries, 32);
}

#[test]
fn loader_rejects_missing_file() {
    let mut loader = ConfigLoader::new();
    let err = loader.load_file("definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::FileLoadError(_)));
}

#[test]
fn loader_rejects_invalid_values() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(file, "[graph]\nmax_traversal_depth = 0\n").unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(file.path()).unwrap();
    assert!(matches!(
        loader.build(),
        Err(ConfigError::ValidationError(_))
    ));
}
