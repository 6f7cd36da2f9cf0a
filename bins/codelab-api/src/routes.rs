use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/run", post(handlers::run_suite))
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(handlers::export_metrics))
}
