//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to dependency:
//!     → circuit_breaker.rs (evaluate state; fail fast while open)
//!     → service.rs (the guarded call, handed its timeout budget)
//!     → timeouts.rs (optional adapter enforcing that budget)
//!     → circuit_breaker.rs (record success/failure)
//!
//! Operational tooling:
//!     → registry.rs (snapshots and forced states by name)
//! ```
//!
//! # Design Decisions
//! - One breaker per protected dependency, shared via Arc
//! - No retries here; a retry layer wraps the breaker, not the reverse
//! - No background tasks; state is recomputed on each request

pub mod circuit_breaker;
pub mod error;
pub mod registry;
pub mod service;
pub mod state;
pub mod timeouts;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker};
pub use error::BreakerError;
pub use registry::{BreakerRegistry, Inspect, RegistryError};
pub use service::{service_fn, Service, ServiceFn};
pub use state::{BreakerState, ParseStateError};
pub use timeouts::{Deadline, TimeoutError};
