//! Future-based acquisition on the tokio timer, and cancellation racing
//! deliveries from other threads.

use crate::test_utils::{fix_at, Harness};
use geofix_acquisition::testing::{CachedBehavior, ScriptedProvider};
use geofix_acquisition::{
    FailureReason, FixResolver, ResolverState, StaticPermissionStore, TokioTimer,
};
use geofix_analysis::evaluate_fix;
use geofix_core::{AcquisitionConfig, FixSource};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;

fn resolver_with(provider: Arc<ScriptedProvider>, timer: Arc<TokioTimer>) -> FixResolver {
    FixResolver::new(
        provider,
        timer,
        Arc::new(StaticPermissionStore::granted_all()),
        AcquisitionConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expires_on_tokio_timer() {
    let provider = Arc::new(ScriptedProvider::new(CachedBehavior::Empty));
    let timer = Arc::new(TokioTimer::new(Handle::current()));
    let resolver = resolver_with(provider.clone(), timer.clone());

    let started = tokio::time::Instant::now();
    let err = resolver.acquire_async().await.unwrap_err();

    assert_eq!(err.reason, FailureReason::Timeout);
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(provider.unsubscribe_calls(), 1);
    assert_eq!(provider.active_subscriptions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_live_update_beats_deadline() {
    let provider = Arc::new(ScriptedProvider::new(CachedBehavior::Empty));
    let timer = Arc::new(TokioTimer::new(Handle::current()));
    let resolver = resolver_with(provider.clone(), timer.clone());

    let pusher = Arc::clone(&provider);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        pusher.push_update(fix_at(35.6762, 139.6503, 6.0, FixSource::Live));
    });

    let fix = resolver.acquire_async().await.unwrap();
    assert_eq!(fix.source, FixSource::Live);

    // The deadline task was aborted; nothing fires later
    tokio::task::yield_now().await;
    assert_eq!(timer.armed(), 0);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(provider.unsubscribe_calls(), 1);

    let assessment = evaluate_fix(&fix);
    assert!(assessment.is_valid());
    assert_eq!(assessment.geo_code.timezone, "UTC+9");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_on_dropped_future_releases_everything() {
    let provider = Arc::new(ScriptedProvider::new(CachedBehavior::Empty));
    let timer = Arc::new(TokioTimer::new(Handle::current()));
    let resolver = resolver_with(provider.clone(), timer.clone());

    let outcome = tokio::time::timeout(Duration::from_secs(1), resolver.acquire_async()).await;
    assert!(outcome.is_err());

    assert!(!resolver.is_in_flight());
    assert_eq!(provider.active_subscriptions(), 0);
    tokio::task::yield_now().await;
    assert_eq!(timer.armed(), 0);
}

fn timeline() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) + Send + Clone + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |event| sink.lock().unwrap().push(event))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_waits_for_deadline_delivered_on_worker() {
    let provider = Arc::new(ScriptedProvider::new(CachedBehavior::Empty));
    let timer = Arc::new(TokioTimer::new(Handle::current()));
    let config = AcquisitionConfig {
        timeout_ms: 20,
        ..AcquisitionConfig::default()
    };
    let resolver = Arc::new(FixResolver::new(
        provider.clone(),
        timer,
        Arc::new(StaticPermissionStore::granted_all()),
        config,
    ));
    let (events, record) = timeline();

    provider.hold_unsubscribe();
    let on_outcome = record.clone();
    resolver.acquire(move |outcome| {
        assert_eq!(outcome.unwrap_err().reason, FailureReason::Timeout);
        on_outcome("callback");
    });

    // The deadline fires on a worker and blocks in unsubscribe
    let waiter = Arc::clone(&provider);
    let blocked = tokio::task::spawn_blocking(move || {
        waiter.wait_for_blocked_unsubscribe(Duration::from_secs(5))
    })
    .await
    .unwrap();
    assert!(blocked);

    let canceller = Arc::clone(&resolver);
    let cancel = std::thread::spawn(move || {
        canceller.cancel();
        record("cancel returned");
    });

    std::thread::sleep(Duration::from_millis(50));
    assert!(events.lock().unwrap().is_empty());

    provider.release_unsubscribe();
    cancel.join().unwrap();

    assert_eq!(*events.lock().unwrap(), vec!["callback", "cancel returned"]);
    assert_eq!(resolver.state(), ResolverState::Idle);
}

#[test]
fn test_destroy_waits_for_update_delivered_on_provider_thread() {
    let harness = Harness::new(CachedBehavior::Empty);
    let resolver = Arc::new(harness.resolver);
    let provider = harness.provider;
    let (events, record) = timeline();

    let on_outcome = record.clone();
    resolver.acquire(move |outcome| {
        assert_eq!(outcome.unwrap().source, FixSource::Live);
        on_outcome("callback");
    });
    provider.hold_unsubscribe();

    let pusher = Arc::clone(&provider);
    let london = fix_at(51.5074, -0.1278, 9.0, FixSource::Live);
    let delivery = std::thread::spawn(move || pusher.push_update(london));
    assert!(provider.wait_for_blocked_unsubscribe(Duration::from_secs(5)));

    let destroyer = Arc::clone(&resolver);
    let destroy = std::thread::spawn(move || {
        destroyer.destroy();
        record("destroy returned");
    });

    std::thread::sleep(Duration::from_millis(50));
    assert!(events.lock().unwrap().is_empty());

    provider.release_unsubscribe();
    assert_eq!(delivery.join().unwrap(), 1);
    destroy.join().unwrap();

    assert_eq!(*events.lock().unwrap(), vec!["callback", "destroy returned"]);
    assert!(resolver.is_destroyed());
    assert!(!resolver.is_in_flight());
}
