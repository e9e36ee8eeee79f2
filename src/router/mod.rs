//! Router configuration.
//!
//! All API routes live under `/api/v1`; health, metrics, and the OpenAPI
//! docs sit at the root.

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CampusPay API",
        description = "Fee rate approval and billing API for the CampusPay school administration platform",
        version = "0.1.0"
    ),
    paths(
        crate::handlers::rates::propose_rate,
        crate::handlers::rates::approve_rate,
        crate::handlers::rates::reject_rate,
        crate::handlers::rates::list_rates,
        crate::handlers::rates::get_rate,
        crate::handlers::dashboard::get_stats,
        crate::handlers::fee_plans::preview_fee_plan,
        crate::handlers::health::health_check,
        crate::handlers::health::health_status,
    ),
    components(schemas(
        crate::models::FeeRate,
        crate::models::RateStatus,
        crate::models::RateStats,
        crate::auth::Role,
        crate::handlers::rates::ProposeRateRequest,
        crate::handlers::rates::RejectRateRequest,
        crate::handlers::fee_plans::PreviewFeePlanRequest,
        crate::services::fee_plan::PlanType,
        crate::services::fee_plan::Discount,
        crate::services::fee_plan::FeePlanPreview,
        crate::services::fee_plan::Installment,
        crate::handlers::health::HealthResponse,
        crate::handlers::health::HealthStatus,
        crate::handlers::health::ServiceHealth,
    ))
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let v1_api = Router::new()
        .nest("/rates", handlers::rates::routes())
        .nest("/dashboard", handlers::dashboard::routes())
        .nest("/fee-plans", handlers::fee_plans::routes());

    let timeout = Duration::from_secs(app_state.config.request_timeout_secs);

    handlers::health::routes()
        .merge(handlers::metrics::routes())
        .nest("/api/v1", v1_api)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    axum::http::StatusCode::REQUEST_TIMEOUT,
                    timeout,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
