// Prometheus metrics for the codelab API
use codelab_common::types::{TestOutcome, TestStatus};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    static ref RUNS_TOTAL: IntCounter =
        register_int_counter!("codelab_runs_total", "Suites submitted to /api/run").unwrap();
    static ref RUN_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "codelab_run_errors_total",
        "Suites aborted by an infrastructure error"
    )
    .unwrap();
    static ref TEST_OUTCOMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "codelab_test_outcomes_total",
        "Test outcomes by status and failure kind",
        &["status", "kind"]
    )
    .unwrap();
    static ref TEST_DURATION_SECONDS: Histogram = register_histogram!(
        "codelab_test_duration_seconds",
        "Wall-clock time of executed test cases",
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .unwrap();
}

pub fn record_run(outcomes: &[TestOutcome]) {
    RUNS_TOTAL.inc();
    for outcome in outcomes {
        let (status, kind) = match outcome.status {
            TestStatus::Passed => ("passed", "none"),
            TestStatus::Failed => ("failed", outcome.failure.map_or("unknown", |k| k.as_str())),
        };
        TEST_OUTCOMES_TOTAL.with_label_values(&[status, kind]).inc();
        if let Some(ms) = outcome.duration_ms {
            TEST_DURATION_SECONDS.observe(ms as f64 / 1000.0);
        }
    }
}

pub fn record_run_error() {
    RUNS_TOTAL.inc();
    RUN_ERRORS_TOTAL.inc();
}

/// Render every registered metric in the Prometheus text format
pub fn render() -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
