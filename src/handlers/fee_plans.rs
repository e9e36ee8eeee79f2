//! Fee plan preview endpoint.

use axum::{response::Json, routing::post, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::Result;
use crate::services::fee_plan::{derive_plan, Discount, FeePlanPreview, PlanType};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PreviewFeePlanRequest {
    #[schema(example = 1000.0)]
    pub total_amount: Decimal,
    pub plan_type: PlanType,
    pub start_date: NaiveDate,
    pub discount: Option<Discount>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/preview", post(preview_fee_plan))
}

/// Derive the installment schedule for a fee total
#[utoipa::path(
    post,
    path = "/api/v1/fee-plans/preview",
    tag = "fee-plans",
    request_body = PreviewFeePlanRequest,
    responses(
        (status = 200, description = "Derived schedule", body = FeePlanPreview),
        (status = 400, description = "Validation error")
    )
)]
pub async fn preview_fee_plan(
    Json(request): Json<PreviewFeePlanRequest>,
) -> Result<Json<FeePlanPreview>> {
    let plan = derive_plan(
        request.total_amount,
        &request.plan_type,
        request.start_date,
        request.discount.as_ref(),
    )?;
    Ok(Json(plan))
}
