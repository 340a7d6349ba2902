use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::types::EngineLimits;

mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../kata.example.toml");

/// Environment variable naming the worker binary
pub const WORKER_ENV: &str = "KATA_WORKER";

/// File name of the worker binary, without platform suffix
pub const WORKER_BINARY: &str = "kata-worker";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for Kata
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Path to the worker binary (discovered if not specified)
    #[serde(default)]
    pub worker_path: Option<PathBuf>,

    /// Wall-clock budget for one judging run, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of worker processes running at once
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Largest response a worker may send back, in bytes
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    /// Interpreter limits forwarded to every worker
    #[serde(default)]
    pub engine: EngineLimits,
}

impl Config {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the run timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the path to the worker binary
    ///
    /// Resolution order: `worker_path`, then `KATA_WORKER`, then a worker
    /// installed next to the current executable, then `kata-worker` on PATH.
    pub fn worker_binary(&self) -> PathBuf {
        if let Some(ref path) = self.worker_path {
            return path.clone();
        }
        if let Some(path) = std::env::var_os(WORKER_ENV) {
            return PathBuf::from(path);
        }
        sibling_worker().unwrap_or_else(|| PathBuf::from(WORKER_BINARY))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_path: None,
            timeout_ms: default_timeout_ms(),
            max_workers: default_max_workers(),
            max_response_bytes: default_max_response_bytes(),
            engine: EngineLimits::default(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_workers() -> usize {
    4
}

fn default_max_response_bytes() -> usize {
    16 * 1024 * 1024
}

/// Look for the worker beside the running executable
///
/// Test binaries are built into a `deps` directory one level below the
/// other binaries, so its parent is searched too.
fn sibling_worker() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let name = format!("{WORKER_BINARY}{}", std::env::consts::EXE_SUFFIX);
    let dir = exe.parent()?;

    let candidate = dir.join(&name);
    if candidate.is_file() {
        return Some(candidate);
    }

    if dir.ends_with("deps") {
        let candidate = dir.parent()?.join(&name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}
