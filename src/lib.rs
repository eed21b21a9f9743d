//! Circuit breaker library.
//!
//! Guards calls to unreliable dependencies: fails fast while a dependency
//! is judged unhealthy and lets a probe through once its retry window has
//! passed.
//!
//! ```no_run
//! use std::time::Duration;
//! use circuit_guard::{service_fn, BreakerError, CircuitBreaker};
//!
//! # async fn example() {
//! let breaker = CircuitBreaker::new(
//!     service_fn(|_timeout: Duration, id: u64| async move {
//!         if id == 0 { Err("not found") } else { Ok(id * 2) }
//!     }),
//!     Duration::from_secs(1),
//!     Duration::from_secs(30),
//!     5,
//! )
//! .with_name("inventory");
//!
//! match breaker.attempt_request(21).await {
//!     Ok(value) => println!("got {}", value),
//!     Err(BreakerError::Open) => println!("inventory unavailable, failing fast"),
//!     Err(BreakerError::Service(e)) => println!("inventory error: {}", e),
//! }
//! # }
//! ```

pub mod config;
pub mod demo;
pub mod observability;
pub mod resilience;

pub use config::{BreakerConfig, GuardConfig};
pub use resilience::{
    service_fn, BreakerError, BreakerRegistry, BreakerSnapshot, BreakerState, CircuitBreaker,
    Deadline, Service, TimeoutError,
};
