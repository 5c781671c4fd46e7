//! Prometheus metrics
//!
//! The dialogue crates record through the `metrics` facade; this module
//! installs the Prometheus recorder and serves its rendering.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder
///
/// Safe to call more than once; later calls return the first handle.
/// Returns `None` if another recorder was installed first.
pub fn init_metrics() -> Option<PrometheusHandle> {
    let handle = PROMETHEUS.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe_metrics();
        Ok::<_, metrics_exporter_prometheus::BuildError>(handle)
    });

    match handle {
        Ok(handle) => Some(handle.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        },
    }
}

fn describe_metrics() {
    metrics::describe_counter!("dialogue_turns_total", "Utterances processed, by outcome");
    metrics::describe_counter!("llm_requests_total", "Completion requests, by final status");
    metrics::describe_counter!("llm_retries_total", "Completion retries after transient failures");
    metrics::describe_counter!("dispatch_total", "Function dispatches, by status");
    metrics::describe_histogram!(
        "llm_request_duration_seconds",
        metrics::Unit::Seconds,
        "Completion latency including retries"
    );
    metrics::describe_gauge!("active_sessions", "Live dialogue sessions");
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled\n".to_string()),
    }
}
