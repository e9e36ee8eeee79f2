//! Fee rate records and their lifecycle states.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{ApiError, Result};

/// Lifecycle state of a fee rate proposal.
///
/// A rate only ever moves forward: from a pending state to `active` or a
/// rejected state, and from `active` to `expired` when superseded. Terminal
/// states accept no further user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RateStatus {
    PendingSchool,
    PendingAdmin,
    Active,
    RejectedBySchool,
    RejectedByAdmin,
    Expired,
}

impl RateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateStatus::PendingSchool => "pending_school",
            RateStatus::PendingAdmin => "pending_admin",
            RateStatus::Active => "active",
            RateStatus::RejectedBySchool => "rejected_by_school",
            RateStatus::RejectedByAdmin => "rejected_by_admin",
            RateStatus::Expired => "expired",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RateStatus::PendingSchool | RateStatus::PendingAdmin)
    }

    /// Terminal with respect to user action.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

impl std::str::FromStr for RateStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending_school" => Ok(RateStatus::PendingSchool),
            "pending_admin" => Ok(RateStatus::PendingAdmin),
            "active" => Ok(RateStatus::Active),
            "rejected_by_school" => Ok(RateStatus::RejectedBySchool),
            "rejected_by_admin" => Ok(RateStatus::RejectedByAdmin),
            "expired" => Ok(RateStatus::Expired),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for RateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct StatusParseError(String);

impl std::fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid rate status: {}", self.0)
    }
}

impl std::error::Error for StatusParseError {}

/// A proposed or active platform service-fee percentage for a school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeeRate {
    pub id: Uuid,
    pub school_id: String,
    #[schema(example = 2.5)]
    pub fee_percentage: Decimal,
    pub status: RateStatus,
    pub proposed_by: String,
    pub proposed_by_role: Role,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub superseded_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, bumped on every mutation.
    pub version: i64,
}

impl FeeRate {
    /// Build a new proposal in its initial state.
    pub fn new_proposal(
        school_id: String,
        fee_percentage: Decimal,
        proposed_by: String,
        proposed_by_role: Role,
        initial_status: RateStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            school_id,
            fee_percentage,
            status: initial_status,
            proposed_by,
            proposed_by_role,
            notes,
            rejection_reason: None,
            created_at: Utc::now(),
            activated_at: None,
            rejected_at: None,
            superseded_at: None,
            version: 1,
        }
    }
}

/// Validate that a fee percentage lies within [0, 100].
pub fn validate_fee_percentage(fee_percentage: Decimal) -> Result<()> {
    if fee_percentage < Decimal::ZERO || fee_percentage > Decimal::from(100) {
        return Err(ApiError::fee_out_of_range("fee_percentage"));
    }
    Ok(())
}

/// Dashboard aggregate over all fee rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateStats {
    /// Count of rates currently active
    pub active_count: i64,
    /// Count of rates awaiting either party's approval
    pub pending_count: i64,
    /// Average fee percentage across active rates (0 when none are active)
    pub avg_fee_percentage: Decimal,
    /// Distinct schools with at least one active rate
    pub schools_configured: i64,
}
