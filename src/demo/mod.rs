//! Demonstration scenarios.
//!
//! # Data Flow
//! ```text
//! CLI / config
//!     → DemoSettings (breaker thresholds + simulated latency)
//!     → scenarios.rs (scripted request loops)
//!     → services.rs (stable, failing, unstable dependencies)
//!     → ScenarioReport (per-attempt outcomes + final snapshot)
//! ```
//!
//! # Design Decisions
//! - Every fixture (outage window, call counter) lives on its service instance
//! - Waits are expressed relative to the breaker's retry window

pub mod scenarios;
pub mod services;

pub use scenarios::{run, DemoSettings, Scenario, ScenarioReport};
