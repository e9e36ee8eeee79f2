//! Fee rate approval workflow service.
//!
//! Orchestrates the state transition engine over the rate store: proposals
//! enter in the state the proposer's role dictates, approvals run the
//! activation swap, rejections stamp the reason. All store writes carry the
//! version read beforehand, so a lost race surfaces as
//! `ConcurrentModification` rather than a partial update.

pub mod transitions;

pub use transitions::{apply, initial_status, RateAction};

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::ActorIdentity;
use crate::database::repository::{FeeRateStore, RateFilter, RatePatch};
use crate::error::Result;
use crate::models::{validate_fee_percentage, FeeRate, RateStatus};

/// Service for proposing and resolving fee rates.
#[derive(Clone)]
pub struct FeeRateService {
    store: Arc<dyn FeeRateStore>,
}

impl FeeRateService {
    pub fn new(store: Arc<dyn FeeRateStore>) -> Self {
        Self { store }
    }

    /// Create a new proposal awaiting the counterparty's approval.
    #[instrument(skip(self, actor, notes), fields(actor_id = %actor.id, role = %actor.role))]
    pub async fn propose(
        &self,
        actor: &ActorIdentity,
        school_id: String,
        fee_percentage: Decimal,
        notes: Option<String>,
    ) -> Result<FeeRate> {
        validate_fee_percentage(fee_percentage)?;

        let rate = FeeRate::new_proposal(
            school_id,
            fee_percentage,
            actor.id.clone(),
            actor.role,
            initial_status(actor.role),
            notes,
        );

        let rate = self.store.create(rate).await?;
        counter!("fee_rate_proposals_total", "role" => actor.role.as_str()).increment(1);
        info!(rate_id = %rate.id, school_id = %rate.school_id, "Fee rate proposed");
        Ok(rate)
    }

    /// Approve a pending rate, activating it and expiring any prior active
    /// rate for the same school.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id, role = %actor.role))]
    pub async fn approve(&self, actor: &ActorIdentity, rate_id: Uuid) -> Result<FeeRate> {
        let rate = self.store.get(rate_id).await?;
        let next = apply(rate.status, RateAction::Approve, actor.role)?;
        debug_assert_eq!(next, RateStatus::Active);

        let rate = self.store.activate(rate.id, rate.version).await?;
        counter!("fee_rate_transitions_total", "action" => "approve").increment(1);
        info!(rate_id = %rate.id, school_id = %rate.school_id, "Fee rate activated");
        Ok(rate)
    }

    /// Reject a pending rate, recording the reason when one is given.
    #[instrument(skip(self, actor, reason), fields(actor_id = %actor.id, role = %actor.role))]
    pub async fn reject(
        &self,
        actor: &ActorIdentity,
        rate_id: Uuid,
        reason: Option<String>,
    ) -> Result<FeeRate> {
        let rate = self.store.get(rate_id).await?;
        let next = apply(rate.status, RateAction::Reject, actor.role)?;

        let patch = RatePatch {
            status: next,
            rejected_at: Some(Utc::now()),
            rejection_reason: reason,
        };
        let rate = self.store.update(rate.id, rate.version, patch).await?;
        counter!("fee_rate_transitions_total", "action" => "reject").increment(1);
        info!(rate_id = %rate.id, status = %rate.status, "Fee rate rejected");
        Ok(rate)
    }

    /// List rates, newest first, optionally filtered by school and status.
    pub async fn list(&self, filter: &RateFilter) -> Result<Vec<FeeRate>> {
        self.store.list(filter).await
    }

    /// Fetch a single rate.
    pub async fn get(&self, rate_id: Uuid) -> Result<FeeRate> {
        self.store.get(rate_id).await
    }
}
