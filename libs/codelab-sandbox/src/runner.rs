/// Suite Runner - Sequential Test Orchestration
///
/// **Execution Flow:**
/// 1. Resolve the entry point once per submission
/// 2. For each test case, in input order:
///    a. Missing `input`/`expected` → failed, nothing executed, no duration
///    b. Unresolved entry point → failed with the resolver message
///    c. Otherwise run one isolated context and evaluate its verdict
/// 3. Return the complete report
///
/// At most one context is alive at a time. A submission fault in one test
/// never affects the next; only infrastructure errors abort the suite, and
/// then no partial report is returned.

use crate::adapter::adapt_arguments;
use crate::config::RuntimeConfig;
use crate::engine::ProcessEngine;
use crate::error::Result;
use crate::evaluator::evaluate;
use crate::resolver::resolve_entry_point;
use codelab_common::types::{FailureKind, TestCase, TestOutcome};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

pub const MISSING_FIELDS_MESSAGE: &str = "Test case missing input or expected value";

pub struct SuiteRunner {
    engine: ProcessEngine,
}

impl SuiteRunner {
    pub fn new(engine: ProcessEngine) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(ProcessEngine::new(config.context_command()))
    }

    pub fn engine(&self) -> &ProcessEngine {
        &self.engine
    }

    #[instrument(
        skip(self, source, tests),
        fields(test_count = tests.len(), timeout_ms = deadline.as_millis() as u64)
    )]
    pub async fn run(&self, source: &str, tests: &[TestCase], deadline: Duration) -> Result<Vec<TestOutcome>> {
        let suite_start = Instant::now();
        let entry_point = resolve_entry_point(source);
        match &entry_point {
            Ok(name) => debug!(entry_point = %name, "Resolved entry point"),
            Err(e) => debug!(error = %e, "No entry point in submission"),
        }

        let mut outcomes = Vec::with_capacity(tests.len());

        for (index, test) in tests.iter().enumerate() {
            let name = test.display_name(index);

            let (input, expected) = match (&test.input, &test.expected) {
                (Some(input), Some(expected)) => (input, expected),
                _ => {
                    debug!(test = %name, "Skipping test case with missing fields");
                    outcomes.push(TestOutcome::failed(
                        name,
                        MISSING_FIELDS_MESSAGE,
                        FailureKind::InvalidTestCase,
                    ));
                    continue;
                }
            };

            let test_start = Instant::now();
            let outcome = match &entry_point {
                Ok(function_name) => {
                    let args = adapt_arguments(input);
                    let verdict = self.engine.execute(source, function_name, &args, deadline).await?;
                    evaluate(&name, expected, verdict, deadline)
                }
                Err(e) => TestOutcome::failed(name, e.to_string(), FailureKind::Resolution),
            };
            let outcome = outcome.with_duration_ms(test_start.elapsed().as_millis() as u64);

            debug!(
                test = %outcome.name,
                status = ?outcome.status,
                duration_ms = outcome.duration_ms,
                "Test case finished"
            );
            outcomes.push(outcome);
        }

        let passed = outcomes.iter().filter(|o| o.is_passed()).count();
        info!(
            tests_passed = passed,
            tests_failed = outcomes.len() - passed,
            total_time_ms = suite_start.elapsed().as_millis() as u64,
            "Suite completed"
        );

        Ok(outcomes)
    }
}
