//! Dashboard aggregation service.
//!
//! Computes the rate statistics consumed by the admin dashboard. The
//! aggregate is pure (no side effects); a small TTL cache in front of it
//! absorbs repeated dashboard polling. Mutating handlers invalidate the
//! cache so a freshly approved or rejected rate shows up immediately.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use crate::database::repository::FeeRateStore;
use crate::error::Result;
use crate::models::RateStats;

const STATS_KEY: &str = "rate_stats";

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn FeeRateStore>,
    cache: Cache<String, RateStats>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn FeeRateStore>, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(cache_ttl)
            .build();
        Self { store, cache }
    }

    /// Aggregate statistics, served from cache within the TTL.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<RateStats> {
        if let Some(hit) = self.cache.get(STATS_KEY).await {
            debug!("Dashboard stats served from cache");
            return Ok(hit);
        }

        let stats = self.store.stats().await?;
        self.cache.insert(STATS_KEY.to_string(), stats.clone()).await;
        Ok(stats)
    }

    /// Drop the cached aggregate after a mutation.
    pub async fn invalidate(&self) {
        self.cache.invalidate(STATS_KEY).await;
    }
}
