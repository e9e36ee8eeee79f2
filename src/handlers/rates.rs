//! Fee rate endpoints: propose, approve, reject, list, fetch.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::ActorIdentity;
use crate::database::repository::RateFilter;
use crate::error::{ApiError, Result};
use crate::models::{FeeRate, RateStatus};

/// New fee rate proposal. The proposer's identity arrives in the actor
/// headers; the initial state follows from the proposer's role.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProposeRateRequest {
    #[validate(length(min = 1, max = 64))]
    #[schema(example = "sch1")]
    pub school_id: String,

    #[schema(example = 2.5)]
    pub fee_percentage: Decimal,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RejectRateRequest {
    #[validate(length(max = 500))]
    #[schema(example = "too high")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRatesQuery {
    /// Restrict to one school
    pub school_id: Option<String>,
    /// Restrict to one lifecycle state
    pub status: Option<RateStatus>,
}

/// Build the fee rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(propose_rate).get(list_rates))
        .route("/{id}", get(get_rate))
        .route("/{id}/approve", post(approve_rate))
        .route("/{id}/reject", post(reject_rate))
}

/// Propose a new fee rate for a school
#[utoipa::path(
    post,
    path = "/api/v1/rates",
    tag = "rates",
    request_body = ProposeRateRequest,
    responses(
        (status = 201, description = "Proposal created awaiting counterparty approval", body = FeeRate),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Actor identity missing")
    )
)]
pub async fn propose_rate(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Json(request): Json<ProposeRateRequest>,
) -> Result<(StatusCode, Json<FeeRate>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let rate = state
        .rate_service
        .propose(&actor, request.school_id, request.fee_percentage, request.notes)
        .await?;

    state.dashboard_service.invalidate().await;
    Ok((StatusCode::CREATED, Json(rate)))
}

/// Approve a pending fee rate, activating it
#[utoipa::path(
    post,
    path = "/api/v1/rates/{id}/approve",
    tag = "rates",
    params(("id" = Uuid, Path, description = "Fee rate id")),
    responses(
        (status = 200, description = "Rate activated", body = FeeRate),
        (status = 403, description = "Actor role may not act on this state"),
        (status = 404, description = "Rate not found"),
        (status = 409, description = "State does not permit approval, or concurrent modification")
    )
)]
pub async fn approve_rate(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeRate>> {
    let rate = state.rate_service.approve(&actor, id).await?;
    state.dashboard_service.invalidate().await;
    Ok(Json(rate))
}

/// Reject a pending fee rate
#[utoipa::path(
    post,
    path = "/api/v1/rates/{id}/reject",
    tag = "rates",
    params(("id" = Uuid, Path, description = "Fee rate id")),
    request_body = RejectRateRequest,
    responses(
        (status = 200, description = "Rate rejected", body = FeeRate),
        (status = 403, description = "Actor role may not act on this state"),
        (status = 404, description = "Rate not found"),
        (status = 409, description = "State does not permit rejection, or concurrent modification")
    )
)]
pub async fn reject_rate(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectRateRequest>>,
) -> Result<Json<FeeRate>> {
    let reason = match body {
        Some(Json(request)) => {
            request
                .validate()
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            request.reason
        }
        None => None,
    };

    let rate = state.rate_service.reject(&actor, id, reason).await?;
    state.dashboard_service.invalidate().await;
    Ok(Json(rate))
}

/// List fee rates, newest first
#[utoipa::path(
    get,
    path = "/api/v1/rates",
    tag = "rates",
    params(ListRatesQuery),
    responses(
        (status = 200, description = "Matching rates, newest first", body = [FeeRate])
    )
)]
pub async fn list_rates(
    State(state): State<AppState>,
    Query(query): Query<ListRatesQuery>,
) -> Result<Json<Vec<FeeRate>>> {
    let filter = RateFilter {
        school_id: query.school_id,
        status: query.status,
    };
    let rates = state.rate_service.list(&filter).await?;
    Ok(Json(rates))
}

/// Fetch a single fee rate
#[utoipa::path(
    get,
    path = "/api/v1/rates/{id}",
    tag = "rates",
    params(("id" = Uuid, Path, description = "Fee rate id")),
    responses(
        (status = 200, description = "The rate", body = FeeRate),
        (status = 404, description = "Rate not found")
    )
)]
pub async fn get_rate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeRate>> {
    let rate = state.rate_service.get(id).await?;
    Ok(Json(rate))
}
