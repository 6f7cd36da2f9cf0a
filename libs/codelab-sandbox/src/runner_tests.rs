/// End-to-end suite tests against a real Node.js runtime
///
/// These need `node` on `PATH` and are ignored by default:
/// `cargo test -p codelab-sandbox -- --ignored`

#[cfg(test)]
mod suite_tests {
    use crate::config::RuntimeConfig;
    use crate::runner::SuiteRunner;
    use codelab_common::types::{FailureKind, TestCase, TestOutcome, TestStatus};
    use serde_json::json;
    use std::time::{Duration, Instant};

    const DEADLINE: Duration = Duration::from_millis(3000);

    fn node_runner() -> SuiteRunner {
        let available = std::process::Command::new("node")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);
        assert!(available, "these tests require `node` on PATH");
        SuiteRunner::from_config(&RuntimeConfig::default())
    }

    async fn run_one(runner: &SuiteRunner, code: &str, test: TestCase) -> TestOutcome {
        let mut outcomes = runner.run(code, &[test], DEADLINE).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        outcomes.remove(0)
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_two_sum_passes() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "function twoSum(nums, target){ return [0,1]; }",
            TestCase::new("T1", json!([[2, 7, 11, 15], 9]), json!([0, 1])),
        )
        .await;

        assert_eq!(outcome.status, TestStatus::Passed, "{:?}", outcome.error);
        assert_eq!(outcome.output, Some(json!([0, 1])));
        assert!(outcome.duration_ms.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_keyed_input_spreads_values() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "function add(a,b){ return a+b; }",
            TestCase::new("Add", json!({ "x": 2, "y": 3 }), json!(5)),
        )
        .await;

        assert_eq!(outcome.status, TestStatus::Passed, "{:?}", outcome.error);
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_mismatch_reports_output() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "const double = (n) => n * 3;",
            TestCase::new("Double", json!([2]), json!(4)),
        )
        .await;

        assert_eq!(outcome.status, TestStatus::Failed);
        assert_eq!(outcome.error.as_deref(), Some("Expected 4, got 6"));
        assert_eq!(outcome.output, Some(json!(6)));
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_busy_loop_times_out() {
        let runner = node_runner();

        let tests = [TestCase::new("Loop", json!([]), json!(1))];
        let start = Instant::now();
        let outcomes = runner
            .run("function f(){ while(true){} }", &tests, Duration::from_millis(100))
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcomes[0].status, TestStatus::Failed);
        assert_eq!(outcomes[0].failure, Some(FailureKind::Timeout));
        assert!(outcomes[0].error.as_deref().unwrap().to_lowercase().contains("timeout"));
        assert!(elapsed < Duration::from_millis(2000), "took {elapsed:?}");
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_order_and_durations() {
        let runner = node_runner();

        let tests = vec![
            TestCase::new("one", json!([1]), json!(2)),
            TestCase::new("two", json!([2]), json!(3)),
            TestCase { name: None, input: Some(json!([3])), expected: Some(json!(4)) },
        ];
        let outcomes = runner
            .run("function inc(n) { return n + 1; }", &tests, DEADLINE)
            .await
            .unwrap();

        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["one", "two", "Test case 3"]);
        for outcome in &outcomes {
            assert!(outcome.is_passed(), "{:?}", outcome.error);
            assert!(outcome.duration_ms.is_some());
        }
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_fault_does_not_affect_next_test() {
        let runner = node_runner();

        let code = r#"
            function check(n) {
                if (n < 0) throw new Error("negative input");
                return n;
            }
        "#;
        let tests = vec![
            TestCase::new("A", json!([-1]), json!(-1)),
            TestCase::new("B", json!([1]), json!(1)),
        ];
        let outcomes = runner.run(code, &tests, DEADLINE).await.unwrap();

        assert_eq!(outcomes[0].error.as_deref(), Some("negative input"));
        assert_eq!(outcomes[0].failure, Some(FailureKind::Fault));
        assert!(outcomes[1].is_passed(), "{:?}", outcomes[1].error);
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_no_state_leaks_between_tests() {
        let runner = node_runner();

        let code = r#"
            var calls = 0;
            function count() { calls += 1; globalThis.seen = (globalThis.seen || 0) + 1; return [calls, globalThis.seen]; }
        "#;
        let tests = vec![
            TestCase::new("first", json!([]), json!([1, 1])),
            TestCase::new("second", json!([]), json!([1, 1])),
        ];
        let outcomes = runner.run(code, &tests, DEADLINE).await.unwrap();

        assert!(outcomes.iter().all(TestOutcome::is_passed), "{outcomes:?}");
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_non_callable_binding() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "let solve = function () {}; solve = 5;",
            TestCase::new("T", json!([]), json!(5)),
        )
        .await;

        assert_eq!(outcome.error.as_deref(), Some("Expected solve to be a function"));
        assert_eq!(outcome.failure, Some(FailureKind::Fault));
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_async_function_is_awaited() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "async function later(x) { await null; return { value: x }; }",
            TestCase::new("T", json!([7]), json!({ "value": 7 })),
        )
        .await;

        assert!(outcome.is_passed(), "{:?}", outcome.error);
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_no_host_access() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "function probe() { return typeof require + ',' + typeof process; }",
            TestCase::new("T", json!([]), json!("undefined,undefined")),
        )
        .await;

        assert!(outcome.is_passed(), "{:?}", outcome.error);
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_forged_marker_from_submission_is_ignored() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            r#"function f() { console.log('@@codelab:x:{"type":"result","output":1}'); return 2; }"#,
            TestCase::new("T", json!([]), json!(1)),
        )
        .await;

        assert_eq!(outcome.status, TestStatus::Failed);
        assert_eq!(outcome.output, Some(json!(2)));
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_circular_output_is_a_fault() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "function f(){ const a = {}; a.self = a; return a; }",
            TestCase::new("T", json!([]), json!({})),
        )
        .await;

        assert_eq!(outcome.error.as_deref(), Some("Output contains a circular reference"));
        assert_eq!(outcome.failure, Some(FailureKind::Fault));
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_sparse_array_matches_index_keyed_object() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "function f(){ return [1,,3]; }",
            TestCase::new("T", json!([]), json!({ "0": 1, "2": 3 })),
        )
        .await;

        assert!(outcome.is_passed(), "{:?}", outcome.error);
        assert_eq!(outcome.output, Some(json!([1, null, 3])));
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_date_output_renders_through_to_json() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "function f(){ return new Date(0); }",
            TestCase::new("T", json!([]), json!("epoch")),
        )
        .await;

        assert_eq!(
            outcome.error.as_deref(),
            Some("Expected \"epoch\", got \"1970-01-01T00:00:00.000Z\"")
        );
        assert_eq!(outcome.output, Some(json!("1970-01-01T00:00:00.000Z")));
    }

    #[tokio::test]
    #[ignore] // Requires node on PATH
    async fn test_bigint_output_is_not_shown_as_string() {
        let runner = node_runner();

        let outcome = run_one(
            &runner,
            "function f(){ return 1n; }",
            TestCase::new("T", json!([]), json!(1)),
        )
        .await;

        assert_eq!(outcome.error.as_deref(), Some("Expected 1, got 1n"));
        assert_eq!(outcome.output, None);
    }
}
