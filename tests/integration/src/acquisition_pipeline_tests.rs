//! Acquisition feeding the analysis pipeline, driven by scripted collaborators.

use crate::test_utils::{fix_at, init_tracing, recorder, Harness};
use geofix_acquisition::testing::CachedBehavior;
use geofix_acquisition::{FailureReason, Permission, ProviderError, ResolverState};
use geofix_analysis::{evaluate_fix, report, BlockchainZone, ValidationReason};
use geofix_core::{AcquisitionConfig, FixSource, LiveRequestConfig, UpdatePriority};
use std::time::Duration;

#[test]
fn test_cached_fix_flows_into_passing_verdict() {
    init_tracing();
    let cached = fix_at(48.85, 2.35, 8.0, FixSource::Live);
    let harness = Harness::new(CachedBehavior::Fix(cached));
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let fix = outcomes[0].as_ref().unwrap();
    assert_eq!(fix.source, FixSource::Cached);
    assert_eq!(harness.provider.subscribe_calls(), 0);
    assert_eq!(harness.timer.scheduled_count(), 0);

    let assessment = evaluate_fix(fix);
    assert!(assessment.is_valid());
    assert_eq!(assessment.verdict.reasons, vec![ValidationReason::Passed]);
    assert_eq!(assessment.geo_code.timezone, "UTC+0");
}

#[test]
fn test_live_fix_in_restricted_jurisdiction() {
    init_tracing();
    let harness = Harness::new(CachedBehavior::Empty);
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);
    assert_eq!(harness.resolver.state(), ResolverState::RequestingLive);
    assert_eq!(harness.timer.pending(), 1);

    let delivered = harness
        .provider
        .push_update(fix_at(31.2304, 121.4737, 15.0, FixSource::Cached));
    assert_eq!(delivered, 1);

    // Torn down: no subscription, no timer, later updates go nowhere
    assert_eq!(harness.provider.active_subscriptions(), 0);
    assert_eq!(harness.provider.unsubscribe_calls(), 1);
    assert_eq!(harness.timer.pending(), 0);
    assert_eq!(harness.provider.push_update(fix_at(0.0, 0.0, 1.0, FixSource::Live)), 0);

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let fix = outcomes[0].as_ref().unwrap();
    assert_eq!(fix.source, FixSource::Live);

    let assessment = evaluate_fix(fix);
    assert!(!assessment.is_valid());
    assert_eq!(
        assessment.verdict.blocking_reasons(),
        vec![ValidationReason::NonCompliantJurisdiction]
    );
    assert_eq!(assessment.verdict.data.blockchain_zone, BlockchainZone::AsiaPacific);
    assert!(report::verdict_report(&assessment.verdict).starts_with("Geo-validation FAILED"));
}

#[test]
fn test_timeout_reports_code_and_unsubscribes_once() {
    let config = AcquisitionConfig {
        timeout_ms: 5_000,
        ..AcquisitionConfig::default()
    };
    let harness = Harness::with_config(CachedBehavior::Empty, config);
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);
    assert_eq!(harness.timer.last_duration(), Some(Duration::from_secs(5)));
    assert_eq!(harness.timer.fire_all(), 1);

    assert_eq!(harness.provider.unsubscribe_calls(), 1);
    assert_eq!(
        harness.resolver.state(),
        ResolverState::Failed(FailureReason::Timeout)
    );

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let err = outcomes[0].as_ref().unwrap_err();
    assert_eq!(err.code(), 3);
    assert!(!err.message.is_empty());
}

#[test]
fn test_cancel_suppresses_late_update() {
    let harness = Harness::new(CachedBehavior::Empty);
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);
    harness.resolver.cancel();

    assert_eq!(harness.provider.active_subscriptions(), 0);
    assert_eq!(harness.timer.pending(), 0);
    assert_eq!(harness.provider.push_update(fix_at(1.0, 1.0, 1.0, FixSource::Live)), 0);
    assert_eq!(harness.timer.fire_all(), 0);
    assert!(outcomes.lock().unwrap().is_empty());
    assert!(!harness.resolver.is_in_flight());
}

#[test]
fn test_permission_denied_never_touches_provider() {
    let harness = Harness::new(CachedBehavior::Fix(fix_at(1.0, 1.0, 1.0, FixSource::Cached)));
    harness.permissions.revoke(Permission::FineLocation);
    harness.permissions.revoke(Permission::CoarseLocation);
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes[0].as_ref().unwrap_err().reason, FailureReason::PermissionDenied);
    assert_eq!(harness.provider.cached_calls(), 0);
    assert_eq!(harness.provider.subscribe_calls(), 0);
}

#[test]
fn test_coarse_permission_alone_authorizes() {
    let harness = Harness::new(CachedBehavior::Fix(fix_at(1.0, 1.0, 1.0, FixSource::Cached)));
    harness.permissions.revoke(Permission::FineLocation);
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);

    assert!(outcomes.lock().unwrap()[0].is_ok());
}

#[test]
fn test_replacement_keeps_single_subscription() {
    let harness = Harness::new(CachedBehavior::Empty);
    let (first, first_callback) = recorder();
    let (second, second_callback) = recorder();

    harness.resolver.acquire(first_callback);
    harness.resolver.acquire(second_callback);

    assert_eq!(harness.provider.subscribe_calls(), 2);
    assert_eq!(harness.provider.active_subscriptions(), 1);
    assert_eq!(harness.timer.pending(), 1);

    harness
        .provider
        .push_update(fix_at(-33.8688, 151.2093, 4.0, FixSource::Live));

    assert!(first.lock().unwrap().is_empty());
    let second = second.lock().unwrap();
    assert_eq!(second.len(), 1);

    let assessment = evaluate_fix(second[0].as_ref().unwrap());
    assert_eq!(assessment.geo_code.timezone, "UTC+10");
    assert!(assessment.is_valid());
}

#[test]
fn test_security_fault_reported_without_timer() {
    let harness = Harness::new(CachedBehavior::Empty);
    harness
        .provider
        .fail_subscribe_with(ProviderError::Security("location disabled by policy".into()));
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);

    let outcomes = outcomes.lock().unwrap();
    let err = outcomes[0].as_ref().unwrap_err();
    assert_eq!(err.reason, FailureReason::SecurityError);
    assert_eq!(err.code(), 2);
    assert_eq!(harness.timer.scheduled_count(), 0);
}

#[test]
fn test_live_request_parameters_reach_provider() {
    let config = AcquisitionConfig {
        live: LiveRequestConfig {
            priority: UpdatePriority::Balanced,
            interval_ms: 20_000,
            fastest_interval_ms: 2_000,
            min_displacement_m: 25.0,
        },
        ..AcquisitionConfig::default()
    };
    let harness = Harness::with_config(CachedBehavior::Empty, config.clone());
    let (_outcomes, callback) = recorder();

    harness.resolver.acquire(callback);

    assert_eq!(harness.provider.last_request(), Some(config.live));
}

#[test]
fn test_invalid_fix_coordinates_yield_invalid_verdict() {
    let harness = Harness::new(CachedBehavior::Fix(fix_at(200.0, 0.0, 1.0, FixSource::Cached)));
    let (outcomes, callback) = recorder();

    harness.resolver.acquire(callback);

    let outcomes = outcomes.lock().unwrap();
    let assessment = evaluate_fix(outcomes[0].as_ref().unwrap());
    assert!(!assessment.is_valid());
    assert_eq!(assessment.verdict.reasons[0], ValidationReason::InvalidCoordinate);
}
