//! Tests for the single-active-rate invariant under concurrency and under
//! arbitrary action sequences.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use campuspay_api::auth::{ActorIdentity, Role};
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

fn setup() -> FeeRateService {
    FeeRateService::new(Arc::new(InMemoryFeeRateStore::new()))
}

async fn active_counts_per_school(service: &FeeRateService) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    let filter = RateFilter {
        school_id: None,
        status: Some(RateStatus::Active),
    };
    for rate in service.list(&filter).await.unwrap() {
        *counts.entry(rate.school_id).or_insert(0) += 1;
    }
    counts
}

#[tokio::test]
async fn test_concurrent_approval_of_one_rate_has_a_single_winner() {
    let service = setup();

    let rate = service
        .propose(&school_admin(), "sch1".to_string(), dec("2.0"), None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let id = rate.id;
        handles.push(tokio::spawn(async move {
            service.approve(&platform_admin(), id).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(rate) => {
                successes += 1;
                assert_eq!(rate.status, RateStatus::Active);
            }
            Err(e) => assert!(
                matches!(
                    e,
                    ApiError::ConcurrentModification | ApiError::InvalidTransition { .. }
                ),
                "unexpected error: {}",
                e
            ),
        }
    }

    assert_eq!(successes, 1);
    let counts = active_counts_per_school(&service).await;
    assert_eq!(counts.get("sch1"), Some(&1));
}

#[tokio::test]
async fn test_concurrent_approvals_for_one_school_leave_one_active() {
    let service = setup();

    let mut ids = Vec::new();
    for i in 0..5 {
        let rate = service
            .propose(
                &school_admin(),
                "sch1".to_string(),
                Decimal::from(i + 1),
                None,
            )
            .await
            .unwrap();
        ids.push(rate.id);
    }

    let mut handles = Vec::new();
    for id in ids {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.approve(&platform_admin(), id).await
        }));
    }
    for handle in handles {
        // Each rate is only approved once, so every approval either wins or
        // loses a version race with a concurrent supersession.
        match handle.await.unwrap() {
            Ok(_) | Err(ApiError::ConcurrentModification) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    let counts = active_counts_per_school(&service).await;
    assert_eq!(counts.get("sch1"), Some(&1));
}

/// One step of a random workflow run.
#[derive(Debug, Clone)]
enum Step {
    Propose { school: u8, fee: u8, by_platform: bool },
    Approve { target: usize, by_platform: bool },
    Reject { target: usize, by_platform: bool },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..3, 0u8..101, any::<bool>()).prop_map(|(school, fee, by_platform)| Step::Propose {
            school,
            fee,
            by_platform
        }),
        (any::<usize>(), any::<bool>()).prop_map(|(target, by_platform)| Step::Approve {
            target,
            by_platform
        }),
        (any::<usize>(), any::<bool>()).prop_map(|(target, by_platform)| Step::Reject {
            target,
            by_platform
        }),
    ]
}

fn actor(by_platform: bool) -> ActorIdentity {
    if by_platform {
        platform_admin()
    } else {
        school_admin()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// No interleaving of proposals, approvals, and rejections ever leaves
    /// a school with more than one active rate.
    #[test]
    fn prop_at_most_one_active_rate_per_school(steps in proptest::collection::vec(step_strategy(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async move {
            let service = setup();
            let mut known_ids = Vec::new();

            for step in steps {
                match step {
                    Step::Propose { school, fee, by_platform } => {
                        let result = service
                            .propose(
                                &actor(by_platform),
                                format!("sch{}", school),
                                Decimal::from(fee),
                                None,
                            )
                            .await;
                        if let Ok(rate) = result {
                            known_ids.push(rate.id);
                        }
                    }
                    Step::Approve { target, by_platform } if !known_ids.is_empty() => {
                        let id = known_ids[target % known_ids.len()];
                        let _ = service.approve(&actor(by_platform), id).await;
                    }
                    Step::Reject { target, by_platform } if !known_ids.is_empty() => {
                        let id = known_ids[target % known_ids.len()];
                        let _ = service.reject(&actor(by_platform), id, None).await;
                    }
                    _ => {}
                }

                for (school, count) in active_counts_per_school(&service).await {
                    prop_assert!(
                        count <= 1,
                        "school {} has {} active rates",
                        school,
                        count
                    );
                }
            }

            Ok(())
        })?;
    }
}
