//! Messages exchanged between the host and a worker process
//!
//! A worker reads exactly one [`WorkerRequest`] from stdin and writes exactly
//! one [`WorkerResponse`] to stdout, both as JSON.

use serde::{Deserialize, Serialize};

use crate::types::{EngineLimits, TestCase, Verdict};

/// Everything a worker needs to judge one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    pub source: String,
    pub function_name: String,
    pub tests: Vec<TestCase>,
    #[serde(default)]
    pub limits: EngineLimits,
}

/// Why a worker could not produce verdicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The submission did not compile or does not define the function
    Compilation,
    /// The engine itself failed
    Fault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerResponse {
    Results { results: Vec<Verdict> },
    Error { kind: FailureKind, error: String },
}

impl WorkerResponse {
    pub fn compilation(error: impl Into<String>) -> Self {
        WorkerResponse::Error {
            kind: FailureKind::Compilation,
            error: error.into(),
        }
    }

    pub fn fault(error: impl Into<String>) -> Self {
        WorkerResponse::Error {
            kind: FailureKind::Fault,
            error: error.into(),
        }
    }
}
