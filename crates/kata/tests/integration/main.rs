//! Integration tests for kata
//!
//! These tests spawn the real `kata-worker` binary that cargo builds next to
//! the test harness.

use std::fs;
use std::path::PathBuf;

use kata::config::Config;
use kata::runner::Runner;

mod compilation;
mod config_loading;
mod execution;
mod problems;
mod rehydration;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get a fixture solution's source
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/solutions/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// Path to a fixture problem file
pub(crate) fn fixture_problem(name: &str) -> PathBuf {
    PathBuf::from(format!("{FIXTURES_PATH}/problems/{name}"))
}

/// Default config pointing at the worker built for this test run
pub(crate) fn test_config() -> Config {
    Config {
        worker_path: Some(PathBuf::from(env!("CARGO_BIN_EXE_kata-worker"))),
        ..Config::default()
    }
}

pub(crate) fn test_runner() -> Runner {
    Runner::new(test_config())
}
