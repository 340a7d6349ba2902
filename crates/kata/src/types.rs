use serde::{Deserialize, Serialize};

use crate::runner::ExecuteError;
use crate::value::Value;

/// A single test case: positional arguments and the expected return value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Arguments passed to the user function, in order
    pub input: Vec<Value>,

    /// Expected return value
    #[serde(rename = "output", alias = "expectedOutput")]
    pub expected_output: Value,
}

impl TestCase {
    pub fn new(input: Vec<Value>, expected_output: impl Into<Value>) -> Self {
        Self {
            input,
            expected_output: expected_output.into(),
        }
    }
}

/// Outcome of running one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Position of the test case in the submitted list
    pub index: usize,

    /// Whether the received output matched the expected output
    pub passed: bool,

    pub expected_output: Value,

    /// Value returned by the user function (`null` if it threw)
    pub received_output: Value,

    /// Test input exactly as supplied, function placeholders included
    pub input: Vec<Value>,

    /// Message of the error thrown during this test case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Lines written to `console` while this test case ran
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

impl Verdict {
    /// Check if this verdict records an error thrown by the user function
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Interpreter limits applied inside the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Maximum JavaScript call depth
    pub recursion_limit: Option<usize>,

    /// Maximum iterations of a single loop (unbounded when unset)
    pub loop_iteration_limit: Option<u64>,

    /// Maximum interpreter value stack size
    pub stack_size_limit: Option<usize>,

    /// Native stack of the interpreter thread in megabytes
    pub thread_stack_mb: usize,
}

impl EngineLimits {
    pub fn thread_stack_bytes(&self) -> usize {
        self.thread_stack_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            recursion_limit: Some(1024),
            loop_iteration_limit: None,
            stack_size_limit: None,
            thread_stack_mb: 64,
        }
    }
}

/// All-or-nothing result of one judging run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExecutionOutcome {
    /// Every test case ran; one verdict per test case, in order
    Results { results: Vec<Verdict> },

    /// The run failed before or while producing verdicts
    Failure { message: String },
}

impl From<Result<Vec<Verdict>, ExecuteError>> for ExecutionOutcome {
    fn from(result: Result<Vec<Verdict>, ExecuteError>) -> Self {
        match result {
            Ok(results) => ExecutionOutcome::Results { results },
            Err(err) => ExecutionOutcome::Failure {
                message: err.to_string(),
            },
        }
    }
}
