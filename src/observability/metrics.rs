//! Metrics collection and exposition.
//!
//! # Metrics
//! - `circuit_breaker_requests_total` (counter): requests by breaker, outcome
//! - `circuit_breaker_request_duration_seconds` (histogram): service call latency
//! - `circuit_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `circuit_breaker_transitions_total` (counter): state changes by from/to
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels are limited to breaker name, outcome and states

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::BreakerState;

/// Outcome label for a guarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Rejected => "rejected",
        }
    }
}

/// Install the Prometheus exporter with an HTTP scrape endpoint at `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a request that reached the service.
pub fn record_call(breaker: &str, outcome: Outcome, start: Instant) {
    counter!(
        "circuit_breaker_requests_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        "circuit_breaker_request_duration_seconds",
        "breaker" => breaker.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request short-circuited by an open breaker.
pub fn record_rejected(breaker: &str) {
    counter!(
        "circuit_breaker_requests_total",
        "breaker" => breaker.to_string(),
        "outcome" => Outcome::Rejected.as_str()
    )
    .increment(1);
}

/// Record a state change and update the state gauge.
pub fn record_transition(breaker: &str, from: BreakerState, to: BreakerState) {
    counter!(
        "circuit_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);

    record_state(breaker, to);
}

pub fn record_state(breaker: &str, state: BreakerState) {
    gauge!("circuit_breaker_state", "breaker" => breaker.to_string()).set(state.as_gauge());
}


#[cfg(test)]
mod tests {
    use super::testing::capture;
    use super::*;

    const REQUESTS: &str = "circuit_breaker_requests_total";
    const TRANSITIONS: &str = "circuit_breaker_transitions_total";
    const STATE: &str = "circuit_breaker_state";

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::Failure.as_str(), "failure");
        assert_eq!(Outcome::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_request_outcomes_are_labelled() {
        let ((), recorded) = capture(|| {
            record_call("inventory", Outcome::Success, Instant::now());
            record_call("inventory", Outcome::Success, Instant::now());
            record_call("inventory", Outcome::Failure, Instant::now());
            record_rejected("inventory");
        });

        let by_outcome = |outcome| {
            recorded.counter(REQUESTS, &[("breaker", "inventory"), ("outcome", outcome)])
        };
        assert_eq!(by_outcome("success"), Some(2));
        assert_eq!(by_outcome("failure"), Some(1));
        assert_eq!(by_outcome("rejected"), Some(1));

        // Rejected requests never reach the service, so only calls are timed.
        assert_eq!(
            recorded.histogram_len(
                "circuit_breaker_request_duration_seconds",
                &[("breaker", "inventory")]
            ),
            Some(3)
        );
    }

    #[test]
    fn test_transition_updates_counter_and_gauge() {
        let ((), recorded) = capture(|| {
            record_transition("billing", BreakerState::Closed, BreakerState::Open);
            record_transition("billing", BreakerState::Open, BreakerState::HalfOpen);
        });

        let transitions = |from, to| {
            recorded.counter(TRANSITIONS, &[("breaker", "billing"), ("from", from), ("to", to)])
        };
        assert_eq!(transitions("CLOSED", "OPENED"), Some(1));
        assert_eq!(transitions("OPENED", "HALF_OPENED"), Some(1));
        assert_eq!(recorded.gauge(STATE, &[("breaker", "billing")]), Some(2.0));
    }

    #[test]
    fn test_state_gauge_encoding() {
        let ((), recorded) = capture(|| {
            record_state("search", BreakerState::Closed);
            record_state("billing", BreakerState::Open);
        });

        assert_eq!(recorded.gauge(STATE, &[("breaker", "search")]), Some(0.0));
        assert_eq!(recorded.gauge(STATE, &[("breaker", "billing")]), Some(1.0));
        assert_eq!(recorded.counter_total(TRANSITIONS), 0);
    }
}
