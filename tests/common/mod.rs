//! Shared utilities for integration and load testing.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use circuit_guard::Service;

/// Mock dependency that counts calls and fails while `failing` is set.
#[derive(Debug, Default)]
pub struct MockService {
    calls: AtomicUsize,
    failing: AtomicBool,
    latency_ms: AtomicUsize,
}

#[allow(dead_code)]
impl MockService {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let svc = Self::default();
        svc.failing.store(true, Ordering::SeqCst);
        Arc::new(svc)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        let millis = usize::try_from(latency.as_millis()).unwrap_or(usize::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }
}

impl<'a> Service<&'a str> for MockService {
    type Response = String;
    type Error = String;

    fn call(
        &self,
        _timeout: Duration,
        request: &'a str,
    ) -> impl Future<Output = Result<String, String>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing.load(Ordering::SeqCst);
        let latency = Duration::from_millis(self.latency_ms.load(Ordering::SeqCst) as u64);
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if failing {
                Err(format!("{}: downstream unavailable", request))
            } else {
                Ok(format!("{}: ok", request))
            }
        }
    }
}
