//! Concurrent callers sharing one breaker.

use std::sync::Arc;
use std::time::Duration;

use circuit_guard::{
    BreakerError, BreakerRegistry, BreakerState, CircuitBreaker, Deadline, TimeoutError,
};

mod common;
use common::MockService;

const CALLERS: usize = 200;

fn shared(
    svc: &Arc<MockService>,
    retry: Duration,
    threshold: u32,
) -> Arc<CircuitBreaker<Arc<MockService>>> {
    Arc::new(CircuitBreaker::new(svc.clone(), Duration::from_secs(1), retry, threshold))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_successes_stay_closed() {
    let svc = MockService::healthy();
    let cb = shared(&svc, Duration::from_secs(60), 5);

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let cb = cb.clone();
            tokio::spawn(async move { cb.attempt_request("read").await })
        })
        .collect();

    for result in futures_util::future::join_all(handles).await {
        assert_eq!(result.unwrap(), Ok("read: ok".to_string()));
    }
    assert_eq!(svc.calls(), CALLERS);
    assert_eq!(cb.state(), BreakerState::Closed);
    assert_eq!(cb.failure_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failures_lose_no_updates() {
    let svc = MockService::failing();
    svc.set_latency(Duration::from_millis(20));
    let cb = shared(&svc, Duration::from_secs(60), 10);

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let cb = cb.clone();
            tokio::spawn(async move { cb.attempt_request("write").await })
        })
        .collect();

    let mut rejected = 0;
    let mut failed = 0;
    for result in futures_util::future::join_all(handles).await {
        match result.unwrap() {
            Err(BreakerError::Open) => rejected += 1,
            Err(BreakerError::Service(_)) => failed += 1,
            Ok(_) => panic!("failing service returned success"),
        }
    }

    assert_eq!(rejected + failed, CALLERS);
    assert_eq!(failed, svc.calls());
    // Every failure that reached the service was counted exactly once.
    assert_eq!(cb.failure_count() as usize, svc.calls());
    assert!(svc.calls() >= 10);
    assert_eq!(cb.state(), BreakerState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expiry_counts_as_failure() {
    let svc = MockService::healthy();
    svc.set_latency(Duration::from_secs(5));
    let cb = CircuitBreaker::new(
        Deadline::new(svc.clone()),
        Duration::from_millis(200),
        Duration::from_secs(2),
        2,
    )
    .with_name("slow");

    for _ in 0..2 {
        let err = cb.attempt_request("search").await.unwrap_err();
        assert_eq!(err, BreakerError::Service(TimeoutError::Elapsed(Duration::from_millis(200))));
    }
    assert_eq!(cb.state(), BreakerState::Open);
    assert_eq!(cb.last_failure_response().as_deref(), Some("deadline of 200ms elapsed"));

    svc.set_latency(Duration::ZERO);
    tokio::time::advance(Duration::from_secs(3)).await;
    assert_eq!(cb.attempt_request("search").await, Ok("search: ok".to_string()));
    assert_eq!(svc.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_registry_reports_many_dependencies() {
    let registry = BreakerRegistry::new();
    let services: Vec<_> = (0..3).map(|_| MockService::failing()).collect();

    let breakers: Vec<_> = ["billing", "inventory", "search"]
        .iter()
        .zip(&services)
        .map(|(name, svc)| {
            let cb = Arc::new(
                CircuitBreaker::new(svc.clone(), Duration::from_secs(1), Duration::from_secs(2), 1)
                    .with_name(*name),
            );
            registry.register(cb.clone()).unwrap();
            cb
        })
        .collect();

    let _ = breakers[1].attempt_request("stock").await;

    let states: Vec<(String, BreakerState)> = registry
        .snapshots()
        .into_iter()
        .map(|s| (s.name, s.state))
        .collect();
    assert_eq!(
        states,
        vec![
            ("billing".to_string(), BreakerState::Closed),
            ("inventory".to_string(), BreakerState::Open),
            ("search".to_string(), BreakerState::Closed),
        ]
    );
}
