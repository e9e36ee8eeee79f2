//! Postgres-backed fee rate store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::database::repository::{FeeRateStore, RateFilter, RatePatch};
use crate::error::ApiError;
use crate::models::{FeeRate, RateStats, RateStatus};

const RATE_COLUMNS: &str = "id, school_id, fee_percentage, status, proposed_by, \
     proposed_by_role, notes, rejection_reason, created_at, activated_at, \
     rejected_at, superseded_at, version";

/// Row shape as stored; status and role are TEXT columns converted at the
/// boundary.
#[derive(Debug, sqlx::FromRow)]
struct FeeRateRow {
    id: Uuid,
    school_id: String,
    fee_percentage: Decimal,
    status: String,
    proposed_by: String,
    proposed_by_role: String,
    notes: Option<String>,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    superseded_at: Option<DateTime<Utc>>,
    version: i64,
}

impl TryFrom<FeeRateRow> for FeeRate {
    type Error = ApiError;

    fn try_from(row: FeeRateRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| ApiError::Internal(format!("Corrupt rate status in store: {}", e)))?;
        let proposed_by_role = row
            .proposed_by_role
            .parse()
            .map_err(|e| ApiError::Internal(format!("Corrupt proposer role in store: {}", e)))?;

        Ok(FeeRate {
            id: row.id,
            school_id: row.school_id,
            fee_percentage: row.fee_percentage,
            status,
            proposed_by: row.proposed_by,
            proposed_by_role,
            notes: row.notes,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            activated_at: row.activated_at,
            rejected_at: row.rejected_at,
            superseded_at: row.superseded_at,
            version: row.version,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    active_count: i64,
    pending_count: i64,
    avg_fee_percentage: Decimal,
    schools_configured: i64,
}

/// Production fee rate store over a Postgres connection pool.
#[derive(Clone)]
pub struct PgFeeRateStore {
    pool: PgPool,
}

impl PgFeeRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> Result<bool, ApiError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM fee_rates WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found > 0)
    }
}

#[async_trait]
impl FeeRateStore for PgFeeRateStore {
    #[instrument(skip(self, rate), fields(rate_id = %rate.id, school_id = %rate.school_id))]
    async fn create(&self, rate: FeeRate) -> Result<FeeRate, ApiError> {
        let query = format!(
            "INSERT INTO fee_rates ({})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {}",
            RATE_COLUMNS, RATE_COLUMNS
        );

        let row = sqlx::query_as::<_, FeeRateRow>(&query)
            .bind(rate.id)
            .bind(&rate.school_id)
            .bind(rate.fee_percentage)
            .bind(rate.status.as_str())
            .bind(&rate.proposed_by)
            .bind(rate.proposed_by_role.as_str())
            .bind(&rate.notes)
            .bind(&rate.rejection_reason)
            .bind(rate.created_at)
            .bind(rate.activated_at)
            .bind(rate.rejected_at)
            .bind(rate.superseded_at)
            .bind(rate.version)
            .fetch_one(&self.pool)
            .await?;

        info!("Fee rate proposal stored");
        row.try_into()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<FeeRate, ApiError> {
        let query = format!("SELECT {} FROM fee_rates WHERE id = $1", RATE_COLUMNS);

        sqlx::query_as::<_, FeeRateRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Fee rate"))?
            .try_into()
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &RateFilter) -> Result<Vec<FeeRate>, ApiError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM fee_rates", RATE_COLUMNS));

        let mut separator = " WHERE ";
        if let Some(school_id) = &filter.school_id {
            builder.push(separator);
            builder.push("school_id = ");
            builder.push_bind(school_id.clone());
            separator = " AND ";
        }
        if let Some(status) = filter.status {
            builder.push(separator);
            builder.push("status = ");
            builder.push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows: Vec<FeeRateRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter().map(FeeRate::try_from).collect()
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        patch: RatePatch,
    ) -> Result<FeeRate, ApiError> {
        let query = format!(
            "UPDATE fee_rates
             SET status = $3,
                 rejected_at = $4,
                 rejection_reason = $5,
                 version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {}",
            RATE_COLUMNS
        );

        let updated = sqlx::query_as::<_, FeeRateRow>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(patch.status.as_str())
            .bind(patch.rejected_at)
            .bind(&patch.rejection_reason)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => row.try_into(),
            None if self.exists(id).await? => Err(ApiError::ConcurrentModification),
            None => Err(ApiError::not_found("Fee rate")),
        }
    }

    #[instrument(skip(self))]
    async fn activate(&self, id: Uuid, expected_version: i64) -> Result<FeeRate, ApiError> {
        let mut tx = self.pool.begin().await?;

        // Expire whatever is currently active for the same school. Scoping
        // by a subselect keeps the whole swap inside one transaction.
        sqlx::query(
            "UPDATE fee_rates
             SET status = $1,
                 superseded_at = NOW(),
                 version = version + 1
             WHERE school_id = (SELECT school_id FROM fee_rates WHERE id = $2)
               AND status = $3
               AND id <> $2",
        )
        .bind(RateStatus::Expired.as_str())
        .bind(id)
        .bind(RateStatus::Active.as_str())
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE fee_rates
             SET status = $3,
                 activated_at = NOW(),
                 version = version + 1
             WHERE id = $1
               AND version = $2
               AND status IN ($4, $5)
             RETURNING {}",
            RATE_COLUMNS
        );

        let activated = sqlx::query_as::<_, FeeRateRow>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(RateStatus::Active.as_str())
            .bind(RateStatus::PendingSchool.as_str())
            .bind(RateStatus::PendingAdmin.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        match activated {
            Some(row) => {
                tx.commit().await?;
                info!("Fee rate activated");
                row.try_into()
            }
            None => {
                tx.rollback().await?;
                if self.exists(id).await? {
                    Err(ApiError::ConcurrentModification)
                } else {
                    Err(ApiError::not_found("Fee rate"))
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<RateStats, ApiError> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT
                 COUNT(*) FILTER (WHERE status = 'active') AS active_count,
                 COUNT(*) FILTER (WHERE status IN ('pending_school', 'pending_admin'))
                     AS pending_count,
                 COALESCE(AVG(fee_percentage) FILTER (WHERE status = 'active'), 0)
                     AS avg_fee_percentage,
                 COUNT(DISTINCT school_id) FILTER (WHERE status = 'active')
                     AS schools_configured
             FROM fee_rates",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(RateStats {
            active_count: row.active_count,
            pending_count: row.pending_count,
            avg_fee_percentage: row.avg_fee_percentage,
            schools_configured: row.schools_configured,
        })
    }

    async fn ping(&self) -> Result<(), ApiError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
