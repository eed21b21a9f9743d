//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//! - Detect duplicate breaker names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::GuardConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("breaker #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("breaker {name:?} is defined more than once")]
    DuplicateName { name: String },

    #[error("breaker {name:?}: timeout_ms must be greater than 0")]
    ZeroTimeout { name: String },

    #[error("breaker {name:?}: failure_threshold must be greater than 0")]
    ZeroThreshold { name: String },

    #[error("invalid log_level {0:?}")]
    InvalidLogLevel(String),

    #[error("invalid metrics_address {0:?}")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, breaker) in config.breakers.iter().enumerate() {
        if breaker.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(breaker.name.as_str()) {
            errors.push(ValidationError::DuplicateName { name: breaker.name.clone() });
        }

        if breaker.timeout_ms == 0 {
            errors.push(ValidationError::ZeroTimeout { name: breaker.name.clone() });
        }
        if breaker.failure_threshold == 0 {
            errors.push(ValidationError::ZeroThreshold { name: breaker.name.clone() });
        }
    }

    let obs = &config.observability;
    if EnvFilter::try_new(&obs.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(obs.log_level.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BreakerConfig;

    fn breaker(name: &str, timeout_ms: u64, failure_threshold: u32) -> BreakerConfig {
        BreakerConfig {
            name: name.to_string(),
            timeout_ms,
            retry_timeout_ms: 2000,
            failure_threshold,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = GuardConfig::default();
        config.breakers.push(breaker("inventory", 1000, 4));
        config.breakers.push(breaker("billing", 500, 2));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GuardConfig::default();
        config.breakers.push(breaker("inventory", 0, 4));
        config.breakers.push(breaker("inventory", 1000, 0));
        config.breakers.push(breaker("  ", 1000, 1));
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroTimeout { name: "inventory".into() },
                ValidationError::DuplicateName { name: "inventory".into() },
                ValidationError::ZeroThreshold { name: "inventory".into() },
                ValidationError::EmptyName { index: 2 },
                ValidationError::InvalidMetricsAddress("not-an-address".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = GuardConfig::default();
        config.observability.metrics_address = "nonsense".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_retry_timeout_is_allowed() {
        let mut config = GuardConfig::default();
        let mut entry = breaker("inventory", 1000, 3);
        entry.retry_timeout_ms = 0;
        config.breakers.push(entry);
        assert!(validate_config(&config).is_ok());
    }
}
