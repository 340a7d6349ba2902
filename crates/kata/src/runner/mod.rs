//! Code runner for Kata
//!
//! Provides the high-level API for judging a submission against its test
//! cases in an isolated worker process.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

pub use crate::runner::execute::execute;

mod execute;

use crate::config::Config;
use crate::problem::Problem;
use crate::types::{TestCase, Verdict};
use crate::worker::WorkerError;

/// Errors that reject a judging run as a whole
///
/// Errors thrown by the user function while a single test case runs are not
/// listed here; they are recorded on that test case's [`Verdict`].
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The source did not compile or does not define a callable function
    #[error("{0}")]
    Compilation(String),

    /// The run exceeded its wall-clock budget and the worker was killed
    #[error("Execution timed out. Consider optimizing your solution.")]
    Timeout,

    /// The worker failed in an unexpected way
    #[error("{0}")]
    HostFault(String),

    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// High-level runner for judging submissions
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
    permits: Arc<Semaphore>,
}

impl Runner {
    /// Create a new runner with the given configuration
    pub fn new(config: Config) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_workers.max(1)));
        Self { config, permits }
    }

    /// Create a new runner with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Judge `source` against `tests` using the configured timeout
    pub async fn execute(
        &self,
        source: &str,
        function_name: &str,
        tests: &[TestCase],
    ) -> Result<Vec<Verdict>, ExecuteError> {
        self.execute_with_timeout(source, function_name, tests, self.config.timeout())
            .await
    }

    /// Judge `source` against `tests` with an explicit timeout
    ///
    /// The timer starts once a worker slot is available, so time spent
    /// waiting behind other runs does not count against the budget.
    #[instrument(skip(self, source, tests), fields(tests = tests.len()))]
    pub async fn execute_with_timeout(
        &self,
        source: &str,
        function_name: &str,
        tests: &[TestCase],
        timeout: Duration,
    ) -> Result<Vec<Verdict>, ExecuteError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ExecuteError::HostFault("runner has been shut down".to_string()))?;
        debug!("acquired worker slot");

        execute::execute(&self.config, source, function_name, tests, timeout).await
    }

    /// Judge `source` against a problem's test cases
    pub async fn run_problem(
        &self,
        problem: &Problem,
        source: &str,
    ) -> Result<Vec<Verdict>, ExecuteError> {
        self.execute(source, &problem.function_name, &problem.tests)
            .await
    }
}
