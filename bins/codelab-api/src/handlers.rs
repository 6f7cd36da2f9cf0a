// HTTP route handlers for the Codelab API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use codelab_common::types::{ErrorResponse, RunRequest, RunResponse};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::metrics;
use crate::AppState;

/// Largest accepted submission, in bytes
pub const MAX_CODE_BYTES: usize = 1024 * 1024;

fn validation_error(message: impl Into<String>, details: Option<serde_json::Value>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            code: Some("VALIDATION_ERROR".to_string()),
            details,
        }),
    )
        .into_response()
}

/// Shape checks on a decoded request; test case contents are judged per test.
fn validate(request: &RunRequest, max_timeout_ms: u64) -> Result<(), Response> {
    if request.code.trim().is_empty() {
        return Err(validation_error("code must be a non-empty string", None));
    }
    if request.code.len() > MAX_CODE_BYTES {
        return Err(validation_error(
            "code is too large",
            Some(json!({ "maxBytes": MAX_CODE_BYTES, "actualBytes": request.code.len() })),
        ));
    }
    if request.tests.is_empty() {
        return Err(validation_error("tests must be a non-empty array", None));
    }
    if request.timeout_ms == 0 || request.timeout_ms > max_timeout_ms {
        return Err(validation_error(
            format!("timeoutMs must be between 1 and {max_timeout_ms}"),
            Some(json!({ "timeoutMs": request.timeout_ms })),
        ));
    }
    Ok(())
}

/// POST /api/run - Run a submission against its test cases
pub async fn run_suite(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected malformed run request");
            return validation_error(
                "Invalid request body",
                Some(json!({ "reason": rejection.body_text() })),
            );
        }
    };

    if let Err(response) = validate(&request, state.config.max_timeout_ms) {
        return response;
    }

    let run_id = Uuid::new_v4();
    info!(
        run_id = %run_id,
        test_count = request.tests.len(),
        timeout_ms = request.timeout_ms,
        "Running suite"
    );

    let deadline = Duration::from_millis(request.timeout_ms);
    match state.runner.run(&request.code, &request.tests, deadline).await {
        Ok(results) => {
            metrics::record_run(&results);
            let passed = results.iter().filter(|r| r.is_passed()).count();
            info!(run_id = %run_id, passed = passed, total = results.len(), "Suite finished");

            (StatusCode::OK, Json(RunResponse { results })).into_response()
        }
        Err(e) => {
            metrics::record_run_error();
            error!(run_id = %run_id, error = %e, "Suite aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to run tests: {e}"),
                    code: Some("INTERNAL_ERROR".to_string()),
                    details: None,
                }),
            )
                .into_response()
        }
    }
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text exposition
pub async fn export_metrics() -> Response {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}
