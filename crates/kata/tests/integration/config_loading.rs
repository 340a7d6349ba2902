use std::path::PathBuf;

use kata::config::{Config, ConfigError};

use super::FIXTURES_PATH;

#[test]
fn test_load_valid_config() {
    let path = format!("{}/configs/valid_full.toml", FIXTURES_PATH);
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(
        config.worker_binary(),
        PathBuf::from("/usr/local/bin/kata-worker")
    );
    assert_eq!(config.timeout_ms, 750);
    assert_eq!(config.max_workers, 8);
    assert_eq!(config.max_response_bytes, 1_048_576);
    assert_eq!(config.engine.recursion_limit, Some(512));
    assert_eq!(config.engine.loop_iteration_limit, Some(1_000_000));
    assert_eq!(config.engine.stack_size_limit, None);
    assert_eq!(config.engine.thread_stack_mb, 32);
}

#[test]
fn test_load_minimal_config() {
    let path = format!("{}/configs/valid_minimal.toml", FIXTURES_PATH);
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.timeout_ms, 1500);
    assert_eq!(config.max_workers, 4);
}

#[test]
fn test_load_invalid_zero_timeout() {
    let path = format!("{}/configs/invalid_zero_timeout.toml", FIXTURES_PATH);
    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_invalid_zero_workers() {
    let path = format!("{}/configs/invalid_zero_workers.toml", FIXTURES_PATH);
    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_nonexistent_file() {
    let result = Config::from_file("/nonexistent/kata.toml");
    assert!(result.is_err());
}
