//! Prometheus /metrics endpoint

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// GET /metrics in Prometheus text exposition format
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.prometheus_handle.as_ref() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "Metrics not enabled".to_string()),
    }
}
