// CLI commands for running submissions locally
use anyhow::{bail, Context, Result};
use codelab_common::types::{RunResponse, TestCase, TestOutcome, TestStatus};
use codelab_sandbox::resolver::resolve_entry_point;
use codelab_sandbox::{RuntimeConfig, SuiteRunner};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

fn read_source(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file {}", path.display()))?;
    if source.trim().is_empty() {
        bail!("Source file {} is empty", path.display());
    }
    Ok(source)
}

fn read_tests(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tests file {}", path.display()))?;
    let tests: Vec<TestCase> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse tests file {}", path.display()))?;
    if tests.is_empty() {
        bail!("Tests file {} contains no test cases", path.display());
    }
    Ok(tests)
}

/// Run a suite and print the results; `Ok(false)` when any test failed
pub async fn run_suite(
    code_path: &Path,
    tests_path: &Path,
    timeout_ms: Option<u64>,
    config_path: &Path,
    json: bool,
) -> Result<bool> {
    let source = read_source(code_path)?;
    let tests = read_tests(tests_path)?;
    let config = RuntimeConfig::load_or_default(config_path)?.with_env_overrides()?;
    debug!(
        config_path = %config_path.display(),
        command = %config.command,
        memory_limit_mb = config.memory_limit_mb,
        "Runtime configuration loaded"
    );

    let timeout_ms = timeout_ms.unwrap_or(config.default_timeout_ms);
    if timeout_ms == 0 || timeout_ms > config.max_timeout_ms {
        bail!("--timeout-ms must be between 1 and {}", config.max_timeout_ms);
    }

    if !json {
        println!("→ Running {} test cases", tests.len());
        println!("  Runtime: {} {} ({})", config.name, config.version, config.command);
        println!("  Timeout: {}ms per test", timeout_ms);
        println!();
    }

    let runner = SuiteRunner::from_config(&config);
    let results = runner
        .run(&source, &tests, Duration::from_millis(timeout_ms))
        .await
        .context("Failed to run tests")?;

    let all_passed = results.iter().all(TestOutcome::is_passed);

    if json {
        println!("{}", serde_json::to_string_pretty(&RunResponse { results })?);
    } else {
        print_report(&results);
    }

    Ok(all_passed)
}

fn print_report(results: &[TestOutcome]) {
    for outcome in results {
        let duration = outcome
            .duration_ms
            .map(|ms| format!(" ({ms}ms)"))
            .unwrap_or_default();

        match outcome.status {
            TestStatus::Passed => println!("  ✓ {}{}", outcome.name, duration),
            TestStatus::Failed => {
                println!("  ✗ {}{}", outcome.name, duration);
                if let Some(error) = &outcome.error {
                    println!("    {}", error);
                }
            }
        }
    }

    let passed = results.iter().filter(|o| o.is_passed()).count();
    println!();
    println!("→ {} / {} passed", passed, results.len());
}

/// Print the resolved entry point; `Ok(false)` when none was found
pub fn resolve(code_path: &Path) -> Result<bool> {
    let source = read_source(code_path)?;
    match resolve_entry_point(&source) {
        Ok(name) => {
            println!("{}", name);
            Ok(true)
        }
        Err(e) => {
            println!("✗ {}", e);
            Ok(false)
        }
    }
}
