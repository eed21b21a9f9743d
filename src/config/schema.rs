//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Breaker entries have no defaults: every threshold must be stated.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// One entry per protected dependency.
    pub breakers: Vec<BreakerConfig>,
}

impl GuardConfig {
    /// Look up a breaker entry by name.
    pub fn breaker(&self, name: &str) -> Option<&BreakerConfig> {
        self.breakers.iter().find(|b| b.name == name)
    }
}

/// Thresholds for a single circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BreakerConfig {
    /// Dependency name used in logs, metrics and the registry.
    pub name: String,

    /// Budget handed to the service on every attempt, in milliseconds.
    pub timeout_ms: u64,

    /// Wait after the last failure before a probe is allowed, in milliseconds.
    pub retry_timeout_ms: u64,

    /// Recorded failures at which the breaker starts short-circuiting.
    pub failure_threshold: u32,
}

impl BreakerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. "info" or "circuit_guard=debug").
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
