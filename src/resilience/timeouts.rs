//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a service so it honors the timeout budget it is handed
//! - Report expiry as a distinct error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner future is dropped on expiry
//! - Timeout errors are distinct from the service's own errors
//! - The breaker never applies this itself; callers opt in per service

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::resilience::service::Service;

/// Error produced by a [`Deadline`]-wrapped service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutError<E> {
    #[error("deadline of {0:?} elapsed")]
    Elapsed(Duration),

    #[error("{0}")]
    Inner(E),
}

impl<E> TimeoutError<E> {
    pub fn is_elapsed(&self) -> bool {
        matches!(self, TimeoutError::Elapsed(_))
    }
}

/// Enforces the timeout budget passed to the wrapped service.
#[derive(Debug, Clone)]
pub struct Deadline<S> {
    inner: S,
}

impl<S> Deadline<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, Req> Service<Req> for Deadline<S>
where
    S: Service<Req>,
{
    type Response = S::Response;
    type Error = TimeoutError<S::Error>;

    fn call(
        &self,
        timeout: Duration,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send {
        let call = self.inner.call(timeout, request);
        async move {
            match tokio::time::timeout(timeout, call).await {
                Ok(result) => result.map_err(TimeoutError::Inner),
                Err(_) => Err(TimeoutError::Elapsed(timeout)),
            }
        }
    }
}
