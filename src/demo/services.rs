//! Simulated dependencies for the demo scenarios.
//!
//! Each service counts its invocations so a scenario can report how many
//! requests actually reached the dependency.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::resilience::circuit_breaker::saturating_millis;
use crate::resilience::Service;

pub const SUCCESS_RESPONSE: &str = "Success Response from service";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{service} error")]
pub struct DemoError {
    pub service: &'static str,
}

/// Always succeeds after `latency`.
#[derive(Debug, Default)]
pub struct StableService {
    latency: Duration,
    calls: AtomicUsize,
}

impl StableService {
    pub fn new(latency: Duration) -> Self {
        Self { latency, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<Req> Service<Req> for StableService {
    type Response = &'static str;
    type Error = DemoError;

    fn call(
        &self,
        timeout: Duration,
        _request: Req,
    ) -> impl Future<Output = Result<&'static str, DemoError>> + Send {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let latency = self.latency.min(timeout);
        async move {
            tokio::time::sleep(latency).await;
            Ok(SUCCESS_RESPONSE)
        }
    }
}

/// Always fails after `latency`.
#[derive(Debug, Default)]
pub struct FailingService {
    latency: Duration,
    calls: AtomicUsize,
}

impl FailingService {
    pub fn new(latency: Duration) -> Self {
        Self { latency, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<Req> Service<Req> for FailingService {
    type Response = &'static str;
    type Error = DemoError;

    fn call(
        &self,
        timeout: Duration,
        _request: Req,
    ) -> impl Future<Output = Result<&'static str, DemoError>> + Send {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let latency = self.latency.min(timeout);
        async move {
            tokio::time::sleep(latency).await;
            Err(DemoError { service: "failing" })
        }
    }
}

/// Succeeds instantly except during a scheduled outage window, when it
/// fails after `latency`.
#[derive(Debug, Default)]
pub struct UnstableService {
    latency: Duration,
    calls: AtomicUsize,
    outage_until: Mutex<Option<Instant>>,
}

impl UnstableService {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            calls: AtomicUsize::new(0),
            outage_until: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Fail every call for the next `duration`.
    pub fn start_outage(&self, duration: Duration) {
        let until = Instant::now() + duration;
        *self.outage_until.lock().unwrap_or_else(|e| e.into_inner()) = Some(until);
        tracing::info!(
            outage_ms = saturating_millis(duration),
            "Unstable service outage started"
        );
    }

    pub fn in_outage(&self) -> bool {
        let until = *self.outage_until.lock().unwrap_or_else(|e| e.into_inner());
        until.is_some_and(|t| t > Instant::now())
    }
}

impl<Req> Service<Req> for UnstableService {
    type Response = &'static str;
    type Error = DemoError;

    fn call(
        &self,
        timeout: Duration,
        _request: Req,
    ) -> impl Future<Output = Result<&'static str, DemoError>> + Send {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let failing = self.in_outage();
        let latency = self.latency.min(timeout);
        async move {
            if !failing {
                return Ok(SUCCESS_RESPONSE);
            }
            tokio::time::sleep(latency).await;
            Err(DemoError { service: "unstable" })
        }
    }
}
