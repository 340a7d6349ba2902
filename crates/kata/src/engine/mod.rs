//! JavaScript judging engine
//!
//! This is the code that runs inside a worker process. An [`Engine`] owns one
//! interpreter context: the submission is compiled into it once, then every
//! test case is invoked against the same compiled function.
//!
//! The interpreter side of the protocol lives in `prelude.js`, which installs
//! a frozen `__kata` hook. Each call into the hook returns a JSON envelope so
//! that outputs, thrown errors and captured console lines all cross back into
//! Rust through `serde_json`.

use std::any::Any;
use std::io::{Read, Write};
use std::thread;

use boa_engine::vm::RuntimeLimits;
use boa_engine::{Context, Source};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use crate::engine::protocol::{FailureKind, WorkerRequest, WorkerResponse};

mod protocol;

use crate::equality::deep_equal;
use crate::rehydrate::{arguments_to_js, quote_js, rehydrate_arguments};
use crate::types::{EngineLimits, TestCase, Verdict};
use crate::value::{Value, from_json_slice};

const PRELUDE: &str = include_str!("prelude.js");

/// Errors that stop an engine from producing any response
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to install judging prelude: {0}")]
    Prelude(String),

    #[error("malformed worker request: {0}")]
    Request(#[source] serde_json::Error),

    #[error("failed to encode worker response: {0}")]
    Response(#[source] serde_json::Error),

    #[error("engine thread failed: {0}")]
    Thread(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one call into the `__kata` hook
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope {
    Ok { value: Value, logs: Vec<String> },
    Error { message: String, logs: Vec<String> },
}

/// An interpreter context with the judging prelude installed
pub struct Engine {
    context: Context,
}

impl Engine {
    /// Create a fresh context governed by the given limits
    pub fn new(limits: &EngineLimits) -> Result<Self, EngineError> {
        let mut context = Context::default();
        context
            .eval(Source::from_bytes(PRELUDE))
            .map_err(|err| EngineError::Prelude(err.to_string()))?;

        let mut runtime = RuntimeLimits::default();
        if let Some(limit) = limits.recursion_limit {
            runtime.set_recursion_limit(limit);
        }
        if let Some(limit) = limits.loop_iteration_limit {
            runtime.set_loop_iteration_limit(limit);
        }
        if let Some(limit) = limits.stack_size_limit {
            runtime.set_stack_size_limit(limit);
        }
        context.set_runtime_limits(runtime);

        Ok(Self { context })
    }

    /// Compile the submission and bind `function_name` as the function under test
    ///
    /// Returns the error message when the source does not parse, throws at
    /// the top level, or does not define a callable with that name.
    pub fn compile(&mut self, source: &str, function_name: &str) -> Result<(), String> {
        if !is_identifier(function_name) {
            return Err(format!("'{function_name}' is not a valid function name"));
        }

        let script = format!(
            "__kata.compile({}, {})",
            quote_js(source),
            quote_js(function_name)
        );
        match self.call(&script)? {
            Envelope::Ok { .. } => Ok(()),
            Envelope::Error { message, .. } => Err(message),
        }
    }

    /// Invoke the compiled function with one test case's input
    ///
    /// A throwing invocation is recorded on the verdict and never escapes.
    pub fn run_test(&mut self, index: usize, test: &TestCase) -> Verdict {
        let arguments = rehydrate_arguments(&test.input);
        let script = format!(
            "__kata.run(function () {{ return {}; }})",
            arguments_to_js(&arguments)
        );

        let (received_output, error, logs) = match self.call(&script) {
            Ok(Envelope::Ok { value, logs }) => (value, None, logs),
            Ok(Envelope::Error { message, logs }) => (Value::Null, Some(message), logs),
            // Runtime limit violations cannot be caught by the hook
            Err(message) => (Value::Null, Some(message), Vec::new()),
        };

        let passed = error.is_none() && deep_equal(&received_output, &test.expected_output);
        debug!(index, passed, "test case judged");

        Verdict {
            index,
            passed,
            expected_output: test.expected_output.clone(),
            received_output,
            input: test.input.clone(),
            error,
            logs,
        }
    }

    fn call(&mut self, script: &str) -> Result<Envelope, String> {
        let result = self
            .context
            .eval(Source::from_bytes(script))
            .map_err(|err| err.to_string())?;
        let text = result
            .as_string()
            .map(|s| s.to_std_string_escaped())
            .ok_or_else(|| "judging hook returned a non-string result".to_string())?;
        from_json_slice(text.as_bytes()).map_err(|err| format!("unreadable judging result: {err}"))
    }
}

/// Judge a request on the current thread
pub fn judge_here(request: &WorkerRequest) -> Result<WorkerResponse, EngineError> {
    let mut engine = Engine::new(&request.limits)?;

    if let Err(message) = engine.compile(&request.source, &request.function_name) {
        debug!(%message, "compilation failed");
        return Ok(WorkerResponse::compilation(message));
    }

    let results = request
        .tests
        .iter()
        .enumerate()
        .map(|(index, test)| engine.run_test(index, test))
        .collect();

    Ok(WorkerResponse::Results { results })
}

/// Judge a request on a dedicated thread sized by the request's limits
///
/// Interpreter recursion consumes native stack, so the engine never runs on
/// the caller's thread.
#[instrument(skip(request), fields(function = %request.function_name, tests = request.tests.len()))]
pub fn judge(request: &WorkerRequest) -> WorkerResponse {
    let owned = request.clone();
    let handle = thread::Builder::new()
        .name("kata-engine".to_string())
        .stack_size(request.limits.thread_stack_bytes())
        .spawn(move || judge_here(&owned));

    let outcome = match handle {
        Ok(handle) => handle
            .join()
            .map_err(|payload| EngineError::Thread(panic_message(payload)))
            .and_then(|result| result),
        Err(err) => Err(EngineError::Io(err)),
    };

    outcome.unwrap_or_else(|err| {
        warn!(error = %err, "engine fault");
        WorkerResponse::fault(err.to_string())
    })
}

/// Read one request, judge it, and write one response terminated by a newline
pub fn serve<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<(), EngineError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    let request: WorkerRequest = from_json_slice(&input).map_err(EngineError::Request)?;

    let response = judge(&request);

    serde_json::to_writer(&mut writer, &response).map_err(EngineError::Response)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "engine panicked".to_string()
    }
}

/// Check that `name` is a plain JavaScript identifier
///
/// Unicode letters are accepted; escape sequences and reserved words are
/// left for the interpreter to reject.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
