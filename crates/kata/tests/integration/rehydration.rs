use kata::problem::Problem;
use kata::types::TestCase;
use kata::value::Value;

use super::{fixture_problem, fixture_source, test_runner};

#[tokio::test]
async fn test_comparator_placeholder() {
    let runner = test_runner();
    let input = vec![
        Value::Array(vec![5.into(), 3.into(), 9.into()]),
        Value::function_literal("(a,b) => a - b"),
    ];
    let tests = vec![TestCase::new(
        input.clone(),
        Value::Array(vec![3.into(), 5.into(), 9.into()]),
    )];

    let verdicts = runner
        .execute(&fixture_source("sort_with.js"), "sortWith", &tests)
        .await
        .expect("Execution failed");

    assert!(verdicts[0].passed, "{:?}", verdicts[0]);
    // The verdict keeps the placeholder encoding, not a live callable
    assert_eq!(verdicts[0].input, input);
    assert_eq!(verdicts[0].input[1].as_function_literal(), Some("(a,b) => a - b"));
}

#[tokio::test]
async fn test_nested_placeholder() {
    let runner = test_runner();
    let source = "function apply(options) { return options.values.map(options.map); }";
    let input = vec![Value::object([
        ("values", Value::Array(vec![1.into(), 2.into()])),
        ("map", Value::function_literal("x => x * 10")),
    ])];
    let tests = vec![TestCase::new(
        input,
        Value::Array(vec![10.into(), 20.into()]),
    )];

    let verdicts = runner
        .execute(source, "apply", &tests)
        .await
        .expect("Execution failed");

    assert!(verdicts[0].passed, "{:?}", verdicts[0]);
}

#[tokio::test]
async fn test_throwing_placeholder_fails_only_its_test() {
    let runner = test_runner();
    let tests = vec![
        TestCase::new(
            vec![
                Value::Array(vec![2.into(), 1.into()]),
                Value::function_literal("() => { throw new Error('bad comparator'); }"),
            ],
            Value::Array(vec![1.into(), 2.into()]),
        ),
        TestCase::new(
            vec![
                Value::Array(vec![2.into(), 1.into()]),
                Value::function_literal("(a, b) => a - b"),
            ],
            Value::Array(vec![1.into(), 2.into()]),
        ),
    ];

    let verdicts = runner
        .execute(&fixture_source("sort_with.js"), "sortWith", &tests)
        .await
        .expect("Execution failed");

    assert_eq!(verdicts[0].error.as_deref(), Some("bad comparator"));
    assert!(verdicts[1].passed);
}

#[tokio::test]
async fn test_problem_file_with_placeholders() {
    let runner = test_runner();
    let problem = Problem::from_file(fixture_problem("sort_with.json")).expect("bad fixture");

    let verdicts = runner
        .run_problem(&problem, &fixture_source("sort_with.js"))
        .await
        .expect("Execution failed");

    assert_eq!(verdicts.len(), 2);
    assert!(verdicts.iter().all(|v| v.passed), "{verdicts:?}");
}
