//! Errors surfaced by guarded calls.

use thiserror::Error;

/// Outcome of a request that did not succeed.
///
/// `Open` is the short-circuit sentinel: the service was never called.
/// `Service` carries the downstream error verbatim. Match on the variant
/// (or use [`BreakerError::is_open`]) rather than on the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakerError<E> {
    /// Request short-circuited because the breaker is open.
    #[error("circuit breaker is open")]
    Open,

    /// The service was invoked and returned an error.
    #[error("{0}")]
    Service(E),
}

impl<E> BreakerError<E> {
    /// True if the request was rejected without reaching the service.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open)
    }

    pub fn service_error(&self) -> Option<&E> {
        match self {
            BreakerError::Service(e) => Some(e),
            BreakerError::Open => None,
        }
    }

    pub fn into_service_error(self) -> Option<E> {
        match self {
            BreakerError::Service(e) => Some(e),
            BreakerError::Open => None,
        }
    }
}
