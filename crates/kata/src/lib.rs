//! A library for judging untrusted JavaScript solutions.
//!
//! Kata compiles a user-supplied JavaScript function, runs it against an
//! ordered list of test cases and reports one [`Verdict`] per test case.
//! Every run happens in a fresh `kata-worker` process that is killed when the
//! run exceeds its time budget.
//!
//! # Features
//!
//! - **Process isolation**: One disposable worker per run, terminated on timeout.
//! - **Structural equality**: NaN-aware deep comparison with type-tag placeholders.
//! - **Input rehydration**: Function placeholders in test inputs become live callables.
//! - **Console capture**: `console.log` output is attached to each verdict.
//! - **TOML configuration**: Timeouts, concurrency and interpreter limits.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG};
pub use engine::{EngineError, FailureKind, WorkerRequest, WorkerResponse};
pub use equality::{TypeTag, deep_equal};
pub use problem::{Difficulty, Problem, ProblemError};
pub use rehydrate::{RuntimeValue, rehydrate, rehydrate_arguments};
pub use runner::{ExecuteError, Runner};
pub use types::{EngineLimits, ExecutionOutcome, TestCase, Verdict};
pub use value::{Opaque, RuntimeCategory, Value};
pub use worker::WorkerError;

pub mod config;
pub mod engine;
pub mod equality;
pub mod problem;
pub mod rehydrate;
pub mod runner;
pub mod types;
pub mod value;
pub mod worker;
