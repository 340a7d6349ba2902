use kata::problem::{Difficulty, Problem};

use super::{fixture_problem, fixture_source, test_runner};

#[test]
fn test_load_problem_file() {
    let problem = Problem::from_file(fixture_problem("two_sum.json")).expect("bad fixture");
    assert_eq!(problem.id, "two-sum");
    assert_eq!(problem.difficulty, Difficulty::Easy);
    assert_eq!(problem.function_name, "twoSum");
    assert_eq!(problem.tests.len(), 3);
}

#[tokio::test]
async fn test_solution_passes_problem() {
    let runner = test_runner();
    let problem = Problem::from_file(fixture_problem("two_sum.json")).expect("bad fixture");

    let verdicts = runner
        .run_problem(&problem, &fixture_source("two_sum.js"))
        .await
        .expect("Execution failed");

    assert_eq!(verdicts.len(), problem.tests.len());
    assert!(verdicts.iter().all(|v| v.passed), "{verdicts:?}");
}

#[tokio::test]
async fn test_starter_code_fails_problem() {
    let runner = test_runner();
    let problem = Problem::from_file(fixture_problem("two_sum.json")).expect("bad fixture");

    let verdicts = runner
        .run_problem(&problem, &problem.starter_code)
        .await
        .expect("Execution failed");

    assert!(verdicts.iter().all(|v| !v.passed));
    assert!(verdicts.iter().all(|v| !v.is_error()));
}
