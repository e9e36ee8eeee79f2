//! Prometheus metrics endpoint.

use axum::{extract::State, routing::get, Router};

use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(render_metrics))
}

/// Render the Prometheus exposition snapshot.
pub async fn render_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
