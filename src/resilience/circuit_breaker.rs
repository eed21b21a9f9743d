//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: dependency assumed down, requests fail fast
//! - Half-Open: retry window elapsed, next request probes the dependency
//!
//! # Evaluation
//! ```text
//! failure_count <  threshold                       → Closed
//! failure_count >= threshold, retry window elapsed → HalfOpen (failure_count halved)
//! failure_count >= threshold, within window        → Open
//! ```
//!
//! # Design Decisions
//! - State is re-derived from counters at the start of every request; no timers
//! - One successful probe closes the breaker and clears history
//! - Every service error counts as a failure; classification belongs to the caller
//! - The service call runs outside the lock; only bookkeeping is serialized
//! - `failure_count` is never clamped to the threshold. Concurrent failures
//!   can push it past the threshold, and a failed probe leaves it at
//!   `halved + 1`
//! - Every failure labels the breaker Open, but logs and metrics only
//!   report Open once `failure_count` reaches the threshold. Below it the
//!   next evaluation lets traffic through, so observers keep seeing Closed

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::observability::metrics::{self, Outcome};
use crate::resilience::error::BreakerError;
use crate::resilience::service::Service;
use crate::resilience::state::BreakerState;

const DEFAULT_NAME: &str = "circuit_breaker";

/// Mutable bookkeeping, guarded by a single mutex.
#[derive(Debug, Default)]
struct Counters {
    state: BreakerState,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    last_failure_response: Option<String>,
    /// Last state published to logs and metrics.
    reported: BreakerState,
}

/// Point-in-time view of a breaker for logs and dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: BreakerState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub timeout_ms: u64,
    pub retry_timeout_ms: u64,
    /// Milliseconds since the last recorded failure.
    pub last_failure_age_ms: Option<u64>,
    pub last_failure_response: Option<String>,
}

/// Guards a [`Service`] and fails fast while it is judged unhealthy.
///
/// Share one instance per dependency (typically behind an `Arc`).
pub struct CircuitBreaker<S> {
    name: String,
    service: S,
    timeout: Duration,
    retry_timeout: Duration,
    failure_threshold: u32,
    counters: Mutex<Counters>,
}

impl<S> fmt::Debug for CircuitBreaker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("retry_timeout", &self.retry_timeout)
            .field("failure_threshold", &self.failure_threshold)
            .field("counters", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl<S> CircuitBreaker<S> {
    /// Create a closed breaker around `service`.
    pub fn new(
        service: S,
        timeout: Duration,
        retry_timeout: Duration,
        failure_threshold: u32,
    ) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            service,
            timeout,
            retry_timeout,
            failure_threshold,
            counters: Mutex::new(Counters::default()),
        }
    }

    /// Create a breaker from a validated config entry, named after it.
    pub fn from_config(service: S, config: &BreakerConfig) -> Self {
        Self::new(service, config.timeout(), config.retry_timeout(), config.failure_threshold)
            .with_name(config.name.clone())
    }

    /// Set the label used in logs, metrics and the registry.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        metrics::record_state(&self.name, self.lock().reported);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_timeout(&self) -> Duration {
        self.retry_timeout
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// State as of the last evaluation or recorded outcome.
    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn state_str(&self) -> &'static str {
        self.state().as_str()
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn last_failure_time(&self) -> Option<Instant> {
        self.lock().last_failure_time
    }

    /// Rendered text of the last downstream error, if any.
    pub fn last_failure_response(&self) -> Option<String> {
        self.lock().last_failure_response.clone()
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let counters = self.lock();
        BreakerSnapshot {
            name: self.name.clone(),
            state: counters.state,
            failure_count: counters.failure_count,
            failure_threshold: self.failure_threshold,
            timeout_ms: saturating_millis(self.timeout),
            retry_timeout_ms: saturating_millis(self.retry_timeout),
            last_failure_age_ms: counters
                .last_failure_time
                .map(|t| saturating_millis(Instant::now().saturating_duration_since(t))),
            last_failure_response: counters.last_failure_response.clone(),
        }
    }

    /// Force the breaker into `target`, rewriting counters so that later
    /// evaluations agree with the forced state.
    ///
    /// - `Open`: count = threshold, last failure = now
    /// - `Closed`: count = 0, last failure cleared
    /// - `HalfOpen`: count = threshold / 2, last failure = now - retry_timeout
    pub fn set_state(&self, target: BreakerState) {
        let now = Instant::now();
        let mut counters = self.lock();

        match target {
            BreakerState::Open => {
                counters.failure_count = self.failure_threshold;
                counters.last_failure_time = Some(now);
            }
            BreakerState::Closed => {
                counters.failure_count = 0;
                counters.last_failure_time = None;
            }
            BreakerState::HalfOpen => {
                counters.failure_count = self.failure_threshold / 2;
                counters.last_failure_time = now.checked_sub(self.retry_timeout);
            }
        }

        tracing::info!(
            breaker = %self.name,
            from = %counters.state,
            to = %target,
            failure_count = counters.failure_count,
            "Circuit breaker state forced"
        );
        self.transition(&mut counters, target);
    }

    /// Guard one request.
    ///
    /// Returns [`BreakerError::Open`] without calling the service while the
    /// breaker is open. Otherwise calls the service with the configured
    /// timeout, records the outcome and returns it unchanged.
    pub async fn attempt_request<Req>(
        &self,
        request: Req,
    ) -> Result<S::Response, BreakerError<S::Error>>
    where
        S: Service<Req>,
        S::Error: fmt::Display,
    {
        let state = self.evaluate_state();

        if state == BreakerState::Open {
            tracing::debug!(breaker = %self.name, "Request short-circuited, breaker open");
            metrics::record_rejected(&self.name);
            return Err(BreakerError::Open);
        }

        let start = std::time::Instant::now();
        match self.service.call(self.timeout, request).await {
            Ok(response) => {
                self.record_success();
                metrics::record_call(&self.name, Outcome::Success, start);
                Ok(response)
            }
            Err(err) => {
                self.record_failure(&err);
                metrics::record_call(&self.name, Outcome::Failure, start);
                Err(BreakerError::Service(err))
            }
        }
    }

    fn evaluate_state(&self) -> BreakerState {
        let now = Instant::now();
        let mut counters = self.lock();

        let next = if counters.failure_count < self.failure_threshold {
            BreakerState::Closed
        } else if self.retry_window_elapsed(counters.last_failure_time, now) {
            counters.failure_count /= 2;
            BreakerState::HalfOpen
        } else {
            BreakerState::Open
        };

        self.transition(&mut counters, next);
        metrics::record_state(&self.name, counters.reported);
        next
    }

    /// A missing timestamp counts as infinitely old.
    fn retry_window_elapsed(&self, last_failure: Option<Instant>, now: Instant) -> bool {
        match last_failure {
            Some(at) => now.saturating_duration_since(at) > self.retry_timeout,
            None => true,
        }
    }

    fn record_success(&self) {
        let mut counters = self.lock();
        counters.failure_count = 0;
        counters.last_failure_time = None;
        self.transition(&mut counters, BreakerState::Closed);
    }

    fn record_failure<E: fmt::Display>(&self, err: &E) {
        let now = Instant::now();
        let mut counters = self.lock();
        counters.failure_count = counters.failure_count.saturating_add(1);
        counters.last_failure_time = Some(now);
        counters.last_failure_response = Some(err.to_string());

        tracing::debug!(
            breaker = %self.name,
            failure_count = counters.failure_count,
            error = %err,
            "Service call failed"
        );
        self.transition(&mut counters, BreakerState::Open);
    }

    fn transition(&self, counters: &mut Counters, to: BreakerState) {
        counters.state = to;

        // Below threshold the next evaluation admits traffic, so report Closed.
        let to = match to {
            BreakerState::Open if counters.failure_count < self.failure_threshold => {
                BreakerState::Closed
            }
            other => other,
        };
        let from = counters.reported;
        if from == to {
            return;
        }
        counters.reported = to;

        match to {
            BreakerState::Open => tracing::warn!(
                breaker = %self.name,
                from = %from,
                failure_count = counters.failure_count,
                "Circuit breaker opened"
            ),
            BreakerState::HalfOpen => tracing::info!(
                breaker = %self.name,
                failure_count = counters.failure_count,
                "Circuit breaker half-open, probing dependency"
            ),
            BreakerState::Closed => tracing::info!(
                breaker = %self.name,
                from = %from,
                failure_count = counters.failure_count,
                "Circuit breaker closed"
            ),
        }
        metrics::record_transition(&self.name, from, to);
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        // Counters are plain values and never left half-written by a panic.
        self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
