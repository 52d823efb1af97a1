//! Prometheus metrics

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

pub const REQUESTS_TOTAL: &str = "compliance_assist_requests_total";
pub const SEARCH_DURATION_SECONDS: &str = "compliance_assist_search_duration_seconds";
pub const KNOWLEDGE_ROWS: &str = "compliance_assist_knowledge_rows";

/// Install the global Prometheus recorder
///
/// Call once per process; a second call fails because a recorder is
/// already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Count a handled request
pub fn record_request(endpoint: &'static str, outcome: &'static str) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// Record matcher latency for one question
pub fn record_search_latency(duration: Duration) {
    metrics::histogram!(SEARCH_DURATION_SECONDS).record(duration.as_secs_f64());
}

/// Record the size of the live knowledge index
pub fn record_knowledge_rows(rows: usize) {
    metrics::gauge!(KNOWLEDGE_ROWS).set(rows as f64);
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics_handle() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
