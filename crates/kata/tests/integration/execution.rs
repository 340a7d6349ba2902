use kata::config::Config;
use kata::runner::{ExecuteError, Runner};
use kata::types::{ExecutionOutcome, TestCase};
use kata::value::{Opaque, Value};
use tokio::task::JoinSet;

use super::{fixture_source, test_config, test_runner};

fn nums(values: &[i32]) -> Value {
    Value::Array(values.iter().copied().map(Value::from).collect())
}

#[tokio::test]
async fn test_all_tests_pass() {
    let runner = test_runner();
    let tests = vec![
        TestCase::new(vec![nums(&[2, 7, 11, 15]), 9.into()], nums(&[0, 1])),
        TestCase::new(vec![nums(&[3, 2, 4]), 6.into()], nums(&[1, 2])),
    ];

    let verdicts = runner
        .execute(&fixture_source("two_sum.js"), "twoSum", &tests)
        .await
        .expect("Execution failed");

    assert_eq!(verdicts.len(), 2);
    assert!(verdicts.iter().all(|v| v.passed));
    assert_eq!(verdicts[0].received_output, nums(&[0, 1]));
}

#[tokio::test]
async fn test_empty_test_list() {
    let runner = test_runner();
    let verdicts = runner
        .execute(&fixture_source("two_sum.js"), "twoSum", &[])
        .await
        .expect("Execution failed");
    assert!(verdicts.is_empty());
}

#[tokio::test]
async fn test_order_preserved_with_one_failure() {
    let runner = test_runner();
    let source = "function double(n) { return n * 2; }";
    let failing = 3;
    let tests: Vec<TestCase> = (0..6)
        .map(|i| {
            let expected = if i == failing { -1 } else { i * 2 };
            TestCase::new(vec![i.into()], expected)
        })
        .collect();

    let verdicts = runner
        .execute(source, "double", &tests)
        .await
        .expect("Execution failed");

    assert_eq!(verdicts.len(), 6);
    for (position, verdict) in verdicts.iter().enumerate() {
        assert_eq!(verdict.index, position);
        assert_eq!(verdict.passed, position != failing as usize);
    }
}

#[tokio::test]
async fn test_thrown_error_is_contained() {
    let runner = test_runner();
    let source = r#"
        function head(list) {
            if (list.length === 0) throw new RangeError("empty list");
            return list[0];
        }
    "#;
    let tests = vec![
        TestCase::new(vec![nums(&[])], Value::Null),
        TestCase::new(vec![nums(&[4, 5])], 4),
    ];

    let verdicts = runner
        .execute(source, "head", &tests)
        .await
        .expect("Execution failed");

    assert!(!verdicts[0].passed);
    assert_eq!(verdicts[0].error.as_deref(), Some("empty list"));
    assert_eq!(verdicts[0].received_output, Value::Null);
    assert!(verdicts[1].passed);
    assert!(verdicts[1].error.is_none());
}

#[tokio::test]
async fn test_nan_and_type_tags() {
    let runner = test_runner();
    let source = r#"
        function pick(kind) {
            switch (kind) {
                case "nan": return 0 / 0;
                case "fn": return (x) => x;
                case "promise": return new Promise(() => {});
                default: return undefined;
            }
        }
    "#;
    let tests = vec![
        TestCase::new(vec!["nan".into()], Value::Number(f64::NAN)),
        TestCase::new(vec!["nan".into()], "number"),
        TestCase::new(vec!["fn".into()], "function"),
        TestCase::new(vec!["promise".into()], "promise"),
        TestCase::new(vec!["none".into()], "undefined"),
        TestCase::new(vec!["fn".into()], "array"),
    ];

    let verdicts = runner
        .execute(source, "pick", &tests)
        .await
        .expect("Execution failed");

    let passed: Vec<bool> = verdicts.iter().map(|v| v.passed).collect();
    assert_eq!(passed, vec![true, true, true, true, true, false]);
    assert_eq!(verdicts[2].received_output, Value::Opaque(Opaque::Function));
}

#[tokio::test]
async fn test_console_logs_are_returned() {
    let runner = test_runner();
    let source = r#"
        function greet(name) {
            console.log("hello", name);
            console.error({ name: name });
            return name.length;
        }
    "#;
    let tests = vec![TestCase::new(vec!["ada".into()], 3)];

    let verdicts = runner
        .execute(source, "greet", &tests)
        .await
        .expect("Execution failed");

    assert!(verdicts[0].passed);
    assert_eq!(
        verdicts[0].logs,
        vec!["hello ada".to_string(), r#"{"name":"ada"}"#.to_string()]
    );
}

#[tokio::test]
async fn test_runaway_recursion_is_a_test_error() {
    let runner = test_runner();
    let tests = vec![TestCase::new(vec![0.into()], 0)];

    let verdicts = runner
        .execute(&fixture_source("deep_recursion.js"), "depth", &tests)
        .await
        .expect("Execution failed");

    assert_eq!(verdicts.len(), 1);
    assert!(verdicts[0].is_error());
    assert!(!verdicts[0].passed);
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let runner = test_runner();
    let source = "let calls = 0; function next() { calls += 1; return calls; }";
    let tests = vec![TestCase::new(vec![], 1), TestCase::new(vec![], 2)];

    let mut runs = JoinSet::new();
    for _ in 0..6 {
        let runner = runner.clone();
        let tests = tests.clone();
        runs.spawn(async move { runner.execute(source, "next", &tests).await });
    }

    while let Some(joined) = runs.join_next().await {
        let verdicts = joined.expect("task panicked").expect("Execution failed");
        assert!(verdicts.iter().all(|v| v.passed), "{verdicts:?}");
    }
}

fn nested(depth: usize) -> Value {
    (0..depth).fold(Value::Array(vec![]), |inner, _| Value::Array(vec![inner]))
}

#[tokio::test]
async fn test_deeply_nested_values_round_trip() {
    let runner = test_runner();
    let source = r#"
        function wrap(value, n) {
            for (let i = 0; i < n; i++) value = [value];
            return value;
        }
    "#;
    let tests = vec![TestCase::new(vec![nested(200), 50.into()], nested(250))];

    let verdicts = runner
        .execute(source, "wrap", &tests)
        .await
        .expect("Execution failed");

    assert_eq!(verdicts[0].error, None);
    assert!(verdicts[0].passed);
    assert_eq!(verdicts[0].received_output, nested(250));
}

#[tokio::test]
async fn test_tag_shaped_objects_are_plain_data() {
    let runner = test_runner();
    let source = "function fake(kind) { return { $runtime: kind }; }";
    let tests = vec![
        TestCase::new(vec!["function".into()], "function"),
        TestCase::new(
            vec!["symbol".into()],
            Value::object([("$runtime", "symbol".into())]),
        ),
    ];

    let verdicts = runner
        .execute(source, "fake", &tests)
        .await
        .expect("Execution failed");

    assert!(!verdicts[0].passed);
    assert_eq!(
        verdicts[0].received_output,
        Value::object([("$runtime", "function".into())])
    );
    assert!(verdicts[1].passed, "{:?}", verdicts[1]);
}

#[tokio::test]
async fn test_oversized_response_is_a_host_fault() {
    let runner = Runner::new(Config {
        max_response_bytes: 1024,
        ..test_config()
    });
    let source = "function big() { return new Array(5000).fill(1); }";
    let tests = vec![TestCase::new(vec![], "array")];

    let result = runner.execute(source, "big", &tests).await;

    assert!(
        matches!(result, Err(ExecuteError::HostFault(ref m)) if m.contains("1024 bytes")),
        "{result:?}"
    );
    assert!(matches!(
        ExecutionOutcome::from(result),
        ExecutionOutcome::Failure { .. }
    ));
}
