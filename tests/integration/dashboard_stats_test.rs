//! Dashboard aggregation and cache behavior.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use campuspay_api::auth::{ActorIdentity, Role};
use campuspay_api::database::repository::FeeRateStore;
use campuspay_api::database::InMemoryFeeRateStore;
use campuspay_api::services::{DashboardService, FeeRateService};

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

fn setup() -> (FeeRateService, DashboardService, Arc<InMemoryFeeRateStore>) {
    let store = Arc::new(InMemoryFeeRateStore::new());
    let rate_service = FeeRateService::new(store.clone());
    let dashboard = DashboardService::new(store.clone(), Duration::from_secs(300));
    (rate_service, dashboard, store)
}

#[tokio::test]
async fn test_empty_store_yields_zeroes() {
    let (_, dashboard, _) = setup();

    let stats = dashboard.stats().await.unwrap();
    assert_eq!(stats.active_count, 0);
    assert_eq!(stats.pending_count, 0);
    assert_eq!(stats.schools_configured, 0);
    assert_eq!(stats.avg_fee_percentage, Decimal::ZERO);
}

#[tokio::test]
async fn test_aggregate_counts_and_average() {
    let (service, dashboard, _) = setup();

    // Two active rates in different schools, at 2.0% and 4.0%.
    for (school, fee) in [("sch1", "2.0"), ("sch2", "4.0")] {
        let rate = service
            .propose(&school_admin(), school.to_string(), dec(fee), None)
            .await
            .unwrap();
        service.approve(&platform_admin(), rate.id).await.unwrap();
    }

    // Three still pending, one rejected.
    for school in ["sch1", "sch2", "sch3"] {
        service
            .propose(&school_admin(), school.to_string(), dec("9.0"), None)
            .await
            .unwrap();
    }
    let rejected = service
        .propose(&school_admin(), "sch3".to_string(), dec("8.0"), None)
        .await
        .unwrap();
    service
        .reject(&platform_admin(), rejected.id, Some("no".to_string()))
        .await
        .unwrap();

    let stats = dashboard.stats().await.unwrap();
    assert_eq!(stats.active_count, 2);
    assert_eq!(stats.pending_count, 3);
    assert_eq!(stats.schools_configured, 2);
    assert_eq!(stats.avg_fee_percentage, dec("3.0"));
}

#[tokio::test]
async fn test_supersession_keeps_active_count_stable() {
    let (service, dashboard, _) = setup();

    let old = service
        .propose(&school_admin(), "sch1".to_string(), dec("2.5"), None)
        .await
        .unwrap();
    service.approve(&platform_admin(), old.id).await.unwrap();
    dashboard.invalidate().await;

    let before = dashboard.stats().await.unwrap();
    assert_eq!(before.active_count, 1);
    assert_eq!(before.avg_fee_percentage, dec("2.5"));

    let new = service
        .propose(&school_admin(), "sch1".to_string(), dec("3.0"), None)
        .await
        .unwrap();
    service.approve(&platform_admin(), new.id).await.unwrap();
    dashboard.invalidate().await;

    let after = dashboard.stats().await.unwrap();
    assert_eq!(after.active_count, 1);
    assert_eq!(after.schools_configured, 1);
    assert_eq!(after.avg_fee_percentage, dec("3.0"));
}

#[tokio::test]
async fn test_cache_serves_stale_until_invalidated() {
    let (service, dashboard, store) = setup();

    let first = dashboard.stats().await.unwrap();
    assert_eq!(first.pending_count, 0);

    service
        .propose(&school_admin(), "sch1".to_string(), dec("2.0"), None)
        .await
        .unwrap();

    // Within the TTL and without invalidation the cached aggregate is
    // returned as-is.
    let cached = dashboard.stats().await.unwrap();
    assert_eq!(cached.pending_count, 0);

    dashboard.invalidate().await;
    let fresh = dashboard.stats().await.unwrap();
    assert_eq!(fresh.pending_count, 1);

    // The aggregate itself has no side effects on the store.
    assert_eq!(store.stats().await.unwrap().pending_count, 1);
}
