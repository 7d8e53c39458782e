use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::gauge;

use crate::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// Prometheus scrape endpoint. Session count is sampled here since buffers
/// are opened lazily and never closed.
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.sessions.open_count().await;
    gauge!("ledger_sessions_open").set(sessions as f64);

    ([(CONTENT_TYPE, PROMETHEUS_TEXT)], state.metrics_handle.render())
}
