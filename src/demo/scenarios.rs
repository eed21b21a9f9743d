//! Scripted request loops against the simulated services.
//!
//! | Scenario   | Service         | Attempts | Script                                  |
//! |------------|-----------------|----------|-----------------------------------------|
//! | `stable`   | always succeeds | 5        | none                                    |
//! | `failing`  | always fails    | 20       | wait 1.5 × retry after attempt 10       |
//! | `unstable` | outage window   | 30       | outage 7.5 × retry after attempt 5      |
//! |            |                 |          | waits 2 × / 2.5 × retry after 10 and 20 |
//!
//! "retry" is the breaker's retry window.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::BreakerConfig;
use crate::demo::services::{FailingService, StableService, UnstableService};
use crate::resilience::circuit_breaker::saturating_millis;
use crate::resilience::{
    BreakerError, BreakerRegistry, BreakerSnapshot, BreakerState, CircuitBreaker, Service,
};

const REQUEST: &str = "test request";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    Stable,
    Failing,
    Unstable,
    All,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Stable => "stable",
            Scenario::Failing => "failing",
            Scenario::Unstable => "unstable",
            Scenario::All => "all",
        }
    }

    /// Concrete scenarios this selection expands to.
    pub fn expand(self) -> Vec<Scenario> {
        match self {
            Scenario::All => vec![Scenario::Stable, Scenario::Failing, Scenario::Unstable],
            other => vec![other],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Ok,
    Failed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub index: usize,
    pub outcome: AttemptOutcome,
    pub state: BreakerState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: &'static str,
    pub attempts: Vec<AttemptRecord>,
    pub service_calls: usize,
    pub snapshot: BreakerSnapshot,
}

impl ScenarioReport {
    pub fn count(&self, outcome: AttemptOutcome) -> usize {
        self.attempts.iter().filter(|a| a.outcome == outcome).count()
    }
}

/// Settings shared by every scenario run.
#[derive(Debug, Clone)]
pub struct DemoSettings {
    pub breaker: BreakerConfig,
    /// Simulated service latency, capped by the timeout budget.
    pub latency: Duration,
    /// Forced onto each breaker before its first request.
    pub initial_state: Option<BreakerState>,
}

impl DemoSettings {
    pub fn new(breaker: BreakerConfig) -> Self {
        let latency = breaker.timeout() / 10;
        Self { breaker, latency, initial_state: None }
    }

    fn retry_scaled(&self, numerator: u32, denominator: u32) -> Duration {
        self.breaker.retry_timeout() * numerator / denominator
    }
}

/// Run the selected scenarios in order, registering each breaker.
pub async fn run(
    selection: Scenario,
    settings: &DemoSettings,
    registry: &BreakerRegistry,
) -> Vec<ScenarioReport> {
    let mut reports = Vec::new();
    for scenario in selection.expand() {
        let report = match scenario {
            Scenario::Stable => run_stable(settings, registry).await,
            Scenario::Failing => run_failing(settings, registry).await,
            Scenario::Unstable => run_unstable(settings, registry).await,
            Scenario::All => continue,
        };
        reports.push(report);
    }
    reports
}

pub async fn run_stable(settings: &DemoSettings, registry: &BreakerRegistry) -> ScenarioReport {
    let service = Arc::new(StableService::new(settings.latency));
    let breaker = build(Scenario::Stable, service.clone(), settings, registry);

    let mut attempts = Vec::new();
    for index in 0..5 {
        attempts.push(attempt(&breaker, index).await);
    }

    report(Scenario::Stable, attempts, service.calls(), &breaker)
}

pub async fn run_failing(settings: &DemoSettings, registry: &BreakerRegistry) -> ScenarioReport {
    let service = Arc::new(FailingService::new(settings.latency));
    let breaker = build(Scenario::Failing, service.clone(), settings, registry);

    let mut attempts = Vec::new();
    for index in 0..20 {
        attempts.push(attempt(&breaker, index).await);
        if index == 10 {
            pause(settings.retry_scaled(3, 2)).await;
        }
    }

    report(Scenario::Failing, attempts, service.calls(), &breaker)
}

pub async fn run_unstable(settings: &DemoSettings, registry: &BreakerRegistry) -> ScenarioReport {
    let service = Arc::new(UnstableService::new(settings.latency));
    let breaker = build(Scenario::Unstable, service.clone(), settings, registry);

    let mut attempts = Vec::new();
    for index in 0..30 {
        attempts.push(attempt(&breaker, index).await);
        match index {
            5 => service.start_outage(settings.retry_scaled(15, 2)),
            10 => pause(settings.retry_scaled(2, 1)).await,
            20 => pause(settings.retry_scaled(5, 2)).await,
            _ => {}
        }
    }

    report(Scenario::Unstable, attempts, service.calls(), &breaker)
}

fn build<S>(
    scenario: Scenario,
    service: S,
    settings: &DemoSettings,
    registry: &BreakerRegistry,
) -> Arc<CircuitBreaker<S>>
where
    S: Send + Sync + 'static,
{
    let name = format!("{}-{}", settings.breaker.name, scenario);
    let breaker = Arc::new(CircuitBreaker::from_config(service, &settings.breaker).with_name(name));

    if let Some(state) = settings.initial_state {
        breaker.set_state(state);
    }
    if let Err(e) = registry.register(breaker.clone()) {
        tracing::warn!(error = %e, "Breaker not registered");
    }

    tracing::info!(
        breaker = %breaker.name(),
        state = %breaker.state_str(),
        failure_threshold = breaker.failure_threshold(),
        "Scenario starting"
    );
    breaker
}

async fn attempt<S>(breaker: &CircuitBreaker<S>, index: usize) -> AttemptRecord
where
    S: Service<&'static str>,
    S::Response: fmt::Display,
    S::Error: fmt::Display,
{
    let outcome = match breaker.attempt_request(REQUEST).await {
        Ok(response) => {
            tracing::info!(
                index,
                response = %response,
                state = %breaker.state_str(),
                "Attempt succeeded"
            );
            AttemptOutcome::Ok
        }
        Err(BreakerError::Open) => {
            tracing::info!(index, state = %breaker.state_str(), "Attempt rejected");
            AttemptOutcome::Rejected
        }
        Err(BreakerError::Service(e)) => {
            tracing::info!(index, error = %e, state = %breaker.state_str(), "Attempt failed");
            AttemptOutcome::Failed
        }
    };

    AttemptRecord { index, outcome, state: breaker.state() }
}

async fn pause(duration: Duration) {
    tracing::info!(wait_ms = saturating_millis(duration), "Waiting for breaker state change");
    tokio::time::sleep(duration).await;
}

fn report<S>(
    scenario: Scenario,
    attempts: Vec<AttemptRecord>,
    service_calls: usize,
    breaker: &CircuitBreaker<S>,
) -> ScenarioReport {
    ScenarioReport {
        scenario: scenario.as_str(),
        attempts,
        service_calls,
        snapshot: breaker.snapshot(),
    }
}
