//! Command builder for worker processes

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

/// Variables a worker is allowed to see from the host environment
pub const DEFAULT_INHERITED_ENV: &[&str] = &["PATH", "RUST_LOG"];

/// Builder for a worker process invocation
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    /// Path to the worker binary
    program: PathBuf,
    env: BTreeMap<String, String>,
    env_inherit: Vec<String>,
    /// Start from an empty environment
    env_clear: bool,
}

impl WorkerCommand {
    /// Create a builder for the given worker binary
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            env: BTreeMap::new(),
            env_inherit: DEFAULT_INHERITED_ENV.iter().map(|s| s.to_string()).collect(),
            env_clear: true,
        }
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Inherit an environment variable from the parent process
    pub fn env_inherit(mut self, key: impl Into<String>) -> Self {
        self.env_inherit.push(key.into());
        self
    }

    /// Keep or drop the parent environment
    pub fn env_clear(mut self, enable: bool) -> Self {
        self.env_clear = enable;
        self
    }

    /// Environment the worker starts with when the parent environment is cleared
    ///
    /// Explicit variables win over inherited ones.
    pub fn resolved_env(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        for key in &self.env_inherit {
            if let Ok(value) = std::env::var(key) {
                env.insert(key.clone(), value);
            }
        }
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }

    /// Build the process command with all standard streams piped
    ///
    /// The child is killed when its handle is dropped.
    pub fn build(self) -> Command {
        let mut command = Command::new(&self.program);
        if self.env_clear {
            command.env_clear();
            command.envs(self.resolved_env());
        } else {
            command.envs(&self.env);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Get the worker binary path
    pub fn program(&self) -> &Path {
        &self.program
    }
}
