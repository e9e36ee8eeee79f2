//! Dashboard statistics endpoint.

use axum::{extract::State, response::Json, routing::get, Router};

use crate::app_state::AppState;
use crate::error::Result;
use crate::models::RateStats;
use crate::services::DashboardService;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

/// Aggregate fee rate statistics for the admin dashboard
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Current aggregate", body = RateStats)
    )
)]
pub async fn get_stats(
    State(dashboard_service): State<DashboardService>,
) -> Result<Json<RateStats>> {
    let stats = dashboard_service.stats().await?;
    Ok(Json(stats))
}
