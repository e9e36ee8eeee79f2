//! Fee rate approval state machine.
//!
//! A proposal always awaits the counterparty of whoever proposed it:
//! platform proposals start in `pending_school`, school proposals in
//! `pending_admin`. The pending party may approve or reject; every other
//! state is terminal with respect to user action. Status only moves
//! forward, never backward.

use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::error::{ApiError, Result};
use crate::models::RateStatus;

/// User action against a pending rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateAction {
    Approve,
    Reject,
}

impl RateAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateAction::Approve => "approve",
            RateAction::Reject => "reject",
        }
    }
}

impl std::fmt::Display for RateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Initial state of a new proposal, determined by the proposer's role.
pub fn initial_status(proposer: Role) -> RateStatus {
    match proposer {
        Role::PlatformAdmin => RateStatus::PendingSchool,
        Role::SchoolAdmin => RateStatus::PendingAdmin,
    }
}

/// Validate an action against the current state and actor, returning the
/// resulting state.
///
/// An action on a terminal state fails with `InvalidStateTransition`; a
/// pending state acted on by the wrong role fails with
/// `UnauthorizedTransition`. Neither is ever silently corrected.
pub fn apply(current: RateStatus, action: RateAction, actor: Role) -> Result<RateStatus> {
    match (current, actor, action) {
        (RateStatus::PendingSchool, Role::SchoolAdmin, RateAction::Approve) => {
            Ok(RateStatus::Active)
        }
        (RateStatus::PendingSchool, Role::SchoolAdmin, RateAction::Reject) => {
            Ok(RateStatus::RejectedBySchool)
        }
        (RateStatus::PendingAdmin, Role::PlatformAdmin, RateAction::Approve) => {
            Ok(RateStatus::Active)
        }
        (RateStatus::PendingAdmin, Role::PlatformAdmin, RateAction::Reject) => {
            Ok(RateStatus::RejectedByAdmin)
        }
        (current, actor, _) if current.is_pending() => Err(ApiError::unauthorized_transition(
            actor.as_str(),
            current.as_str(),
        )),
        (current, _, action) => Err(ApiError::invalid_transition(
            current.as_str(),
            action.as_str(),
        )),
    }
}
