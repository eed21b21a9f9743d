//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breakers produce:
//!     → tracing events (transitions, rejections, forced states)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Pull-only: nothing is pushed to callers, they read state or scrape
//! - Metrics are cheap (atomic increments behind the facade)

pub mod logging;
pub mod metrics;
