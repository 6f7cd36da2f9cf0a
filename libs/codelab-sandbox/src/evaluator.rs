/// Test Evaluator - Verdict to Outcome
///
/// **Core Responsibility:**
/// Turn the raw [`ContextVerdict`] of one context run into a [`TestOutcome`].
///
/// **Critical Properties:**
/// - Knows nothing about processes or pipes
/// - Pure function: (name, expected, verdict, deadline) → outcome
///
/// **Rules:**
/// - Returned: structural comparison against `expected`; the produced
///   output is attached whether it matches or not
/// - Faulted: the context's error message, verbatim
/// - TimedOut: `Test "<name>" exceeded <ms>ms timeout`
/// - Terminated: the termination description

use crate::comparator::structurally_equal;
use crate::engine::ContextVerdict;
use crate::value::JsValue;
use codelab_common::types::{FailureKind, TestOutcome};
use serde_json::Value;
use std::time::Duration;

pub fn evaluate(name: &str, expected: &Value, verdict: ContextVerdict, deadline: Duration) -> TestOutcome {
    match verdict {
        ContextVerdict::Returned(output) => {
            let expected_value = JsValue::from(expected);
            if structurally_equal(&output, &expected_value) {
                TestOutcome::passed(name, output.to_json())
            } else {
                TestOutcome::failed(name, mismatch_message(expected, &output), FailureKind::Mismatch)
                    .with_output(output.to_json())
            }
        }
        ContextVerdict::Faulted(message) => TestOutcome::failed(name, message, FailureKind::Fault),
        ContextVerdict::TimedOut => TestOutcome::failed(
            name,
            timeout_message(name, deadline),
            FailureKind::Timeout,
        ),
        ContextVerdict::Terminated(description) => {
            TestOutcome::failed(name, description, FailureKind::Crash)
        }
    }
}

pub fn timeout_message(name: &str, deadline: Duration) -> String {
    format!("Test \"{}\" exceeded {}ms timeout", name, deadline.as_millis())
}

fn mismatch_message(expected: &Value, output: &JsValue) -> String {
    format!("Expected {}, got {}", expected, output.stringify())
}
