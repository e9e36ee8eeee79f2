//! In-memory fee rate store.
//!
//! Mirrors the Postgres implementation's semantics, including the
//! optimistic-concurrency checks and the atomic activation swap (a single
//! write-lock critical section here). Backs the unit and integration test
//! suites, which cannot assume a running database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::repository::{FeeRateStore, RateFilter, RatePatch};
use crate::error::ApiError;
use crate::models::{FeeRate, RateStats, RateStatus};

#[derive(Clone, Default)]
pub struct InMemoryFeeRateStore {
    rates: Arc<RwLock<HashMap<Uuid, FeeRate>>>,
}

impl InMemoryFeeRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeeRateStore for InMemoryFeeRateStore {
    async fn create(&self, rate: FeeRate) -> Result<FeeRate, ApiError> {
        let mut rates = self.rates.write().await;
        rates.insert(rate.id, rate.clone());
        Ok(rate)
    }

    async fn get(&self, id: Uuid) -> Result<FeeRate, ApiError> {
        let rates = self.rates.read().await;
        rates
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Fee rate"))
    }

    async fn list(&self, filter: &RateFilter) -> Result<Vec<FeeRate>, ApiError> {
        let rates = self.rates.read().await;
        let mut matched: Vec<FeeRate> = rates
            .values()
            .filter(|rate| {
                filter
                    .school_id
                    .as_ref()
                    .is_none_or(|school| &rate.school_id == school)
                    && filter.status.is_none_or(|status| rate.status == status)
            })
            .cloned()
            .collect();

        // Newest first, id as the tie-break so ordering stays deterministic.
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(matched)
    }

    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        patch: RatePatch,
    ) -> Result<FeeRate, ApiError> {
        let mut rates = self.rates.write().await;
        let rate = rates
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Fee rate"))?;

        if rate.version != expected_version {
            return Err(ApiError::ConcurrentModification);
        }

        rate.status = patch.status;
        rate.rejected_at = patch.rejected_at;
        rate.rejection_reason = patch.rejection_reason;
        rate.version += 1;
        Ok(rate.clone())
    }

    async fn activate(&self, id: Uuid, expected_version: i64) -> Result<FeeRate, ApiError> {
        // One critical section covers both records, so no reader observes a
        // school with zero or two active rates.
        let mut rates = self.rates.write().await;

        let target = rates.get(&id).ok_or_else(|| ApiError::not_found("Fee rate"))?;
        if target.version != expected_version || !target.status.is_pending() {
            return Err(ApiError::ConcurrentModification);
        }
        let school_id = target.school_id.clone();
        let now = Utc::now();

        for other in rates.values_mut() {
            if other.id != id
                && other.school_id == school_id
                && other.status == RateStatus::Active
            {
                other.status = RateStatus::Expired;
                other.superseded_at = Some(now);
                other.version += 1;
            }
        }

        let rate = rates.get_mut(&id).expect("checked above");
        rate.status = RateStatus::Active;
        rate.activated_at = Some(now);
        rate.version += 1;
        Ok(rate.clone())
    }

    async fn stats(&self) -> Result<RateStats, ApiError> {
        let rates = self.rates.read().await;

        let mut active_count = 0i64;
        let mut pending_count = 0i64;
        let mut active_fee_sum = Decimal::ZERO;
        let mut schools = HashSet::new();

        for rate in rates.values() {
            match rate.status {
                RateStatus::Active => {
                    active_count += 1;
                    active_fee_sum += rate.fee_percentage;
                    schools.insert(rate.school_id.clone());
                }
                status if status.is_pending() => pending_count += 1,
                _ => {}
            }
        }

        let avg_fee_percentage = if active_count > 0 {
            active_fee_sum / Decimal::from(active_count)
        } else {
            Decimal::ZERO
        };

        Ok(RateStats {
            active_count,
            pending_count,
            avg_fee_percentage,
            schools_configured: schools.len() as i64,
        })
    }

    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
