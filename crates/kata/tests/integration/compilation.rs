use std::path::PathBuf;

use kata::config::Config;
use kata::runner::{ExecuteError, Runner};
use kata::types::{ExecutionOutcome, TestCase, Verdict};
use kata::worker::WorkerError;

use super::{fixture_source, test_runner};

#[tokio::test]
async fn test_syntax_error() {
    let runner = test_runner();
    let tests = vec![TestCase::new(vec![], 1)];

    let err = runner
        .execute(&fixture_source("syntax_error.js"), "f", &tests)
        .await
        .unwrap_err();

    match err {
        ExecuteError::Compilation(message) => assert!(!message.is_empty()),
        other => panic!("expected a compilation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_function() {
    let runner = test_runner();
    let err = runner
        .execute(&fixture_source("two_sum.js"), "threeSum", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ExecuteError::Compilation(_)));
}

#[tokio::test]
async fn test_non_callable_binding() {
    let runner = test_runner();
    let err = runner
        .execute("var answer = 42;", "answer", &[TestCase::new(vec![], 42)])
        .await
        .unwrap_err();

    let result: Result<Vec<Verdict>, ExecuteError> = Err(err);
    let outcome = ExecutionOutcome::from(result);
    match outcome {
        ExecutionOutcome::Failure { message } => {
            assert_eq!(message, "answer is not a function");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_top_level_throw() {
    let runner = test_runner();
    let source = "throw new Error('refusing to load'); function f() {}";
    let err = runner.execute(source, "f", &[]).await.unwrap_err();
    assert!(matches!(err, ExecuteError::Compilation(ref m) if m == "refusing to load"));
}

#[tokio::test]
async fn test_missing_worker_binary() {
    let config = Config {
        worker_path: Some(PathBuf::from("/nonexistent/kata-worker")),
        ..Config::default()
    };
    let runner = Runner::new(config);

    let err = runner
        .execute("function f() {}", "f", &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::Worker(WorkerError::SpawnFailed { .. })
    ));
}
