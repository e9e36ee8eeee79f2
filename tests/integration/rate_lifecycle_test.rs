//! End-to-end tests for the fee rate approval workflow, running the real
//! service against the in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use campuspay_api::auth::{ActorIdentity, Role};
use campuspay_api::database::repository::FeeRateStore;
use campuspay_api::database::{InMemoryFeeRateStore, RateFilter};
use campuspay_api::error::ApiError;
use campuspay_api::models::RateStatus;
use campuspay_api::services::FeeRateService;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn platform_admin() -> ActorIdentity {
    ActorIdentity {
        id: "platform-1".to_string(),
        role: Role::PlatformAdmin,
    }
}

fn school_admin() -> ActorIdentity {
    ActorIdentity {
        id: "school-1".to_string(),
        role: Role::SchoolAdmin,
    }
}

fn setup() -> (FeeRateService, Arc<InMemoryFeeRateStore>) {
    let store = Arc::new(InMemoryFeeRateStore::new());
    (FeeRateService::new(store.clone()), store)
}

#[tokio::test]
async fn test_platform_proposal_awaits_school() {
    let (service, _) = setup();

    let rate = service
        .propose(&platform_admin(), "sch1".to_string(), dec("2.5"), None)
        .await
        .unwrap();

    assert_eq!(rate.status, RateStatus::PendingSchool);
    assert_eq!(rate.proposed_by_role, Role::PlatformAdmin);
    assert_eq!(rate.fee_percentage, dec("2.5"));
    assert!(rate.activated_at.is_none());
}

#[tokio::test]
async fn test_school_proposal_awaits_platform() {
    let (service, _) = setup();

    let rate = service
        .propose(&school_admin(), "sch1".to_string(), dec("1.8"), None)
        .await
        .unwrap();

    assert_eq!(rate.status, RateStatus::PendingAdmin);
    assert_eq!(rate.proposed_by_role, Role::SchoolAdmin);
}

#[tokio::test]
async fn test_out_of_range_proposal_creates_no_record() {
    let (service, _) = setup();

    for fee in ["150", "-1", "101", "100.01"] {
        let err = service
            .propose(&platform_admin(), "sch1".to_string(), dec(fee), None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ApiError::ValidationWithField { .. }),
            "fee {} should be rejected",
            fee
        );
    }

    let rates = service.list(&RateFilter::default()).await.unwrap();
    assert!(rates.is_empty());
}

#[tokio::test]
async fn test_boundary_percentages_are_accepted() {
    let (service, _) = setup();

    for fee in ["0", "100"] {
        service
            .propose(&platform_admin(), "sch1".to_string(), dec(fee), None)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_platform_approval_activates_pending_admin() {
    let (service, _) = setup();

    let rate = service
        .propose(&school_admin(), "sch1".to_string(), dec("3.0"), None)
        .await
        .unwrap();
    let rate = service.approve(&platform_admin(), rate.id).await.unwrap();

    assert_eq!(rate.status, RateStatus::Active);
    assert!(rate.activated_at.is_some());
    assert_eq!(rate.version, 2);
}

#[tokio::test]
async fn test_wrong_role_cannot_decide() {
    let (service, _) = setup();

    let rate = service
        .propose(&school_admin(), "sch1".to_string(), dec("3.0"), None)
        .await
        .unwrap();

    let err = service.approve(&school_admin(), rate.id).await.unwrap_err();
    assert!(matches!(err, ApiError::UnauthorizedTransition { .. }));

    let err = service
        .reject(&school_admin(), rate.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UnauthorizedTransition { .. }));

    // The rate is untouched either way.
    let rate = service.get(rate.id).await.unwrap();
    assert_eq!(rate.status, RateStatus::PendingAdmin);
    assert_eq!(rate.version, 1);
}

#[tokio::test]
async fn test_terminal_states_reject_further_action() {
    let (service, _) = setup();

    let rate = service
        .propose(&school_admin(), "sch1".to_string(), dec("3.0"), None)
        .await
        .unwrap();
    service.approve(&platform_admin(), rate.id).await.unwrap();

    let err = service.approve(&platform_admin(), rate.id).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition { .. }));

    let err = service
        .reject(&platform_admin(), rate.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_rejection_records_reason_and_touches_nothing_else() {
    let (service, store) = setup();

    // An unrelated active rate for another school.
    let other = service
        .propose(&school_admin(), "sch2".to_string(), dec("1.0"), None)
        .await
        .unwrap();
    let other = service.approve(&platform_admin(), other.id).await.unwrap();

    let rate = service
        .propose(&school_admin(), "sch1".to_string(), dec("9.0"), None)
        .await
        .unwrap();
    let rate = service
        .reject(&platform_admin(), rate.id, Some("too high".to_string()))
        .await
        .unwrap();

    assert_eq!(rate.status, RateStatus::RejectedByAdmin);
    assert_eq!(rate.rejection_reason.as_deref(), Some("too high"));
    assert!(rate.rejected_at.is_some());
    assert!(rate.activated_at.is_none());

    let other = service.get(other.id).await.unwrap();
    assert_eq!(other.status, RateStatus::Active);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.active_count, 1);
}

#[tokio::test]
async fn test_school_side_decisions_are_symmetric() {
    let (service, _) = setup();

    let approved = service
        .propose(&platform_admin(), "sch1".to_string(), dec("2.0"), None)
        .await
        .unwrap();
    let approved = service.approve(&school_admin(), approved.id).await.unwrap();
    assert_eq!(approved.status, RateStatus::Active);

    let rejected = service
        .propose(&platform_admin(), "sch2".to_string(), dec("2.0"), None)
        .await
        .unwrap();
    let rejected = service
        .reject(&school_admin(), rejected.id, Some("not agreed".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected.status, RateStatus::RejectedBySchool);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("not agreed"));
}

#[tokio::test]
async fn test_approval_supersedes_prior_active_rate() {
    let (service, store) = setup();

    let old = service
        .propose(&school_admin(), "sch1".to_string(), dec("2.5"), None)
        .await
        .unwrap();
    let old = service.approve(&platform_admin(), old.id).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.active_count, 1);
    assert_eq!(stats.avg_fee_percentage, dec("2.5"));

    let new = service
        .propose(&school_admin(), "sch1".to_string(), dec("3.0"), None)
        .await
        .unwrap();
    let new = service.approve(&platform_admin(), new.id).await.unwrap();

    assert_eq!(new.status, RateStatus::Active);

    let old = service.get(old.id).await.unwrap();
    assert_eq!(old.status, RateStatus::Expired);
    assert!(old.superseded_at.is_some());

    // Still exactly one active rate for the school; the average now
    // reflects 3.0 in place of 2.5.
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.active_count, 1);
    assert_eq!(stats.schools_configured, 1);
    assert_eq!(stats.avg_fee_percentage, dec("3.0"));
}

#[tokio::test]
async fn test_listing_is_idempotent_and_newest_first() {
    let (service, _) = setup();

    let first = service
        .propose(&school_admin(), "sch1".to_string(), dec("1.0"), None)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = service
        .propose(&school_admin(), "sch1".to_string(), dec("2.0"), None)
        .await
        .unwrap();

    let filter = RateFilter::for_school("sch1");
    let listed = service.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    let again = service.list(&filter).await.unwrap();
    assert_eq!(listed, again);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let (service, _) = setup();

    let pending = service
        .propose(&school_admin(), "sch1".to_string(), dec("1.0"), None)
        .await
        .unwrap();
    let active = service
        .propose(&school_admin(), "sch1".to_string(), dec("2.0"), None)
        .await
        .unwrap();
    service.approve(&platform_admin(), active.id).await.unwrap();

    let filter = RateFilter {
        school_id: Some("sch1".to_string()),
        status: Some(RateStatus::PendingAdmin),
    };
    let listed = service.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, pending.id);
}

#[tokio::test]
async fn test_get_unknown_rate_is_not_found() {
    let (service, _) = setup();

    let err = service.get(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
