use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Per-test deadline applied when a request does not carry one
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// A programmer-supplied test case
///
/// `input` and `expected` distinguish an absent key (`None`) from an explicit
/// JSON `null` (`Some(Value::Null)`): only an absent key makes the test case
/// invalid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, input: Value, expected: Value) -> Self {
        Self {
            name: Some(name.into()),
            input: Some(input),
            expected: Some(expected),
        }
    }

    /// Name reported for the test at `index` (0-based) in its suite
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Test case {}", index + 1),
        }
    }
}

/// Maps any present value, including `null`, to `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Why a test failed. Never serialized; callers only see `status` and `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// `input` or `expected` missing; nothing was executed
    InvalidTestCase,
    /// No entry point could be resolved from the submission
    Resolution,
    /// The entry point returned a value that differs from `expected`
    Mismatch,
    /// Loading or invoking the submission raised an error
    Fault,
    /// The context was killed at the deadline
    Timeout,
    /// The context terminated without reporting a result
    Crash,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidTestCase => "invalid_test_case",
            FailureKind::Resolution => "resolution",
            FailureKind::Mismatch => "mismatch",
            FailureKind::Fault => "fault",
            FailureKind::Timeout => "timeout",
            FailureKind::Crash => "crash",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub name: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl TestOutcome {
    pub fn passed(name: impl Into<String>, output: Option<Value>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            error: None,
            output,
            duration_ms: None,
            failure: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            error: Some(error.into()),
            output: None,
            duration_ms: None,
            failure: Some(kind),
        }
    }

    pub fn with_output(mut self, output: Option<Value>) -> Self {
        self.output = output;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn is_passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Body of `POST /api/run`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub code: String,
    pub tests: Vec<TestCase>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub results: Vec<TestOutcome>,
}

/// Error body shared by every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
