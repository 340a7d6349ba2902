//! Execution step for judging runs
//!
//! Spawns a worker, hands it the submission and waits for verdicts under
//! the run timeout.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::engine::{FailureKind, WorkerRequest, WorkerResponse};
use crate::runner::ExecuteError;
use crate::types::{TestCase, Verdict};
use crate::value::from_json_slice;
use crate::worker::{WorkerCommand, WorkerError, WorkerExit, WorkerProcess};

/// Judge a submission in a fresh worker process
///
/// Exactly one worker and one timer exist per call. On timeout the worker
/// is killed and no partial results are returned.
#[instrument(skip(config, source, tests), fields(tests = tests.len()))]
pub async fn execute(
    config: &Config,
    source: &str,
    function_name: &str,
    tests: &[TestCase],
    timeout: Duration,
) -> Result<Vec<Verdict>, ExecuteError> {
    let request = WorkerRequest {
        source: source.to_string(),
        function_name: function_name.to_string(),
        tests: tests.to_vec(),
        limits: config.engine.clone(),
    };
    let payload = serde_json::to_vec(&request).map_err(WorkerError::Encode)?;

    let command = WorkerCommand::new(config.worker_binary());
    let mut process = WorkerProcess::spawn(command)?;

    let exchanged =
        tokio::time::timeout(timeout, process.exchange(&payload, config.max_response_bytes)).await;

    let exit = match exchanged {
        Ok(Ok(exit)) => exit,
        // An oversized response is something the submission caused
        Ok(Err(err @ WorkerError::ResponseTooLarge { .. })) => {
            return Err(ExecuteError::HostFault(err.to_string()));
        }
        Ok(Err(err)) => return Err(err.into()),
        Err(_) => {
            warn!(?timeout, pid = ?process.id(), "worker timed out, killing it");
            if let Err(err) = process.kill().await {
                warn!(error = %err, "failed to kill timed out worker");
            }
            return Err(ExecuteError::Timeout);
        }
    };

    let verdicts = interpret(exit, tests.len())?;
    debug!(
        passed = verdicts.iter().filter(|v| v.passed).count(),
        total = verdicts.len(),
        "execution complete"
    );
    Ok(verdicts)
}

/// Turn a finished worker's output into verdicts or a run-level error
fn interpret(exit: WorkerExit, expected: usize) -> Result<Vec<Verdict>, ExecuteError> {
    if !exit.status.success() {
        return Err(ExecuteError::HostFault(exit.failure_reason()));
    }

    let response: WorkerResponse = from_json_slice(&exit.stdout)
        .map_err(|err| ExecuteError::HostFault(WorkerError::Decode(err).to_string()))?;

    match response {
        WorkerResponse::Results { results } => {
            check_order(&results, expected)?;
            Ok(results)
        }
        WorkerResponse::Error {
            kind: FailureKind::Compilation,
            error,
        } => Err(ExecuteError::Compilation(error)),
        WorkerResponse::Error {
            kind: FailureKind::Fault,
            error,
        } => Err(ExecuteError::HostFault(error)),
    }
}

/// Verdicts must cover every test case exactly once, in order
fn check_order(results: &[Verdict], expected: usize) -> Result<(), ExecuteError> {
    if results.len() != expected {
        return Err(ExecuteError::HostFault(format!(
            "worker returned {} verdicts for {expected} test cases",
            results.len()
        )));
    }
    if let Some((position, verdict)) = results
        .iter()
        .enumerate()
        .find(|(position, verdict)| verdict.index != *position)
    {
        return Err(ExecuteError::HostFault(format!(
            "worker returned verdict {} at position {position}",
            verdict.index
        )));
    }
    Ok(())
}
