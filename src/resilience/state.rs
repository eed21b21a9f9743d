//! Breaker state.
//!
//! # State Transitions
//! ```text
//! Closed   → Open:     failure recorded (trips once failure_count >= threshold)
//! Open     → HalfOpen: retry_timeout elapsed since last failure
//! HalfOpen → Closed:   probe succeeds
//! HalfOpen → Open:     probe fails
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BreakerState {
    /// Requests pass through to the service.
    #[default]
    #[serde(rename = "CLOSED")]
    Closed,
    /// Requests fail fast without reaching the service.
    #[serde(rename = "OPENED")]
    Open,
    /// Retry window elapsed; the next request probes the service.
    #[serde(rename = "HALF_OPENED")]
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "CLOSED",
            BreakerState::Open => "OPENED",
            BreakerState::HalfOpen => "HALF_OPENED",
        }
    }

    /// Numeric encoding used by the state gauge.
    pub fn as_gauge(&self) -> f64 {
        match self {
            BreakerState::Closed => 0.0,
            BreakerState::Open => 1.0,
            BreakerState::HalfOpen => 2.0,
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a breaker state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown breaker state: {0:?}")]
pub struct ParseStateError(pub String);

impl FromStr for BreakerState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closed" => Ok(BreakerState::Closed),
            "open" | "opened" => Ok(BreakerState::Open),
            "half_open" | "half-open" | "half_opened" | "halfopen" => Ok(BreakerState::HalfOpen),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}
