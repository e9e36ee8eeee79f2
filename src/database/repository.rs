//! Fee rate store abstraction.
//!
//! The approval workflow mutates records only through this trait, which
//! carries the optimistic-concurrency discipline (`expected_version`) and
//! the two-record activation swap. `PgFeeRateStore` is the production
//! implementation; `InMemoryFeeRateStore` backs the test suites with the
//! same semantics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{FeeRate, RateStats, RateStatus};

/// Filter for rate listings. Both dimensions are optional.
#[derive(Debug, Clone, Default)]
pub struct RateFilter {
    pub school_id: Option<String>,
    pub status: Option<RateStatus>,
}

impl RateFilter {
    pub fn for_school(school_id: impl Into<String>) -> Self {
        Self {
            school_id: Some(school_id.into()),
            status: None,
        }
    }
}

/// Fields a state transition writes back to a record.
#[derive(Debug, Clone)]
pub struct RatePatch {
    pub status: RateStatus,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Persistence boundary for fee rate records.
#[async_trait]
pub trait FeeRateStore: Send + Sync {
    /// Insert a new rate in its initial state.
    async fn create(&self, rate: FeeRate) -> Result<FeeRate, ApiError>;

    /// Fetch a single rate; `NotFound` when the id does not exist.
    async fn get(&self, id: Uuid) -> Result<FeeRate, ApiError>;

    /// List rates matching the filter, newest first.
    async fn list(&self, filter: &RateFilter) -> Result<Vec<FeeRate>, ApiError>;

    /// Apply a transition's resulting fields.
    ///
    /// Fails with `NotFound` when the id does not exist, or
    /// `ConcurrentModification` when the record was mutated since it was
    /// read (version mismatch).
    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        patch: RatePatch,
    ) -> Result<FeeRate, ApiError>;

    /// Activate a pending rate, expiring any other active rate for the same
    /// school within the same atomic operation.
    ///
    /// No concurrent reader observes a school with zero or two active rates
    /// across the swap. The version guard makes a lost race surface as
    /// `ConcurrentModification`.
    async fn activate(&self, id: Uuid, expected_version: i64) -> Result<FeeRate, ApiError>;

    /// Aggregate dashboard statistics.
    async fn stats(&self) -> Result<RateStats, ApiError>;

    /// Backing-store liveness check for the health endpoint.
    async fn ping(&self) -> Result<(), ApiError>;
}
