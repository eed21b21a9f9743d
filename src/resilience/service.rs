//! The protected call.
//!
//! # Responsibilities
//! - Define the contract a guarded dependency implements
//! - Adapt plain async closures into services
//!
//! # Design Decisions
//! - The timeout budget is handed to the service, never enforced by the
//!   breaker (see `timeouts.rs` for an adapter that enforces it)
//! - Transport agnostic: HTTP, RPC and database clients all fit

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A downstream operation guarded by a circuit breaker.
pub trait Service<Req> {
    type Response;
    type Error;

    /// Invoke the dependency. Implementations should give up once
    /// `timeout` has elapsed.
    fn call(
        &self,
        timeout: Duration,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send;
}

impl<S, Req> Service<Req> for Arc<S>
where
    S: Service<Req>,
{
    type Response = S::Response;
    type Error = S::Error;

    fn call(
        &self,
        timeout: Duration,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send {
        (**self).call(timeout, request)
    }
}

/// Service built from a closure. See [`service_fn`].
#[derive(Clone, Copy)]
pub struct ServiceFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for ServiceFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceFn").finish_non_exhaustive()
    }
}

/// Wrap `Fn(Duration, Req) -> impl Future<Output = Result<T, E>>` as a service.
pub fn service_fn<F>(f: F) -> ServiceFn<F> {
    ServiceFn { f }
}

impl<F, Fut, Req, T, E> Service<Req> for ServiceFn<F>
where
    F: Fn(Duration, Req) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send,
{
    type Response = T;
    type Error = E;

    fn call(&self, timeout: Duration, request: Req) -> impl Future<Output = Result<T, E>> + Send {
        (self.f)(timeout, request)
    }
}
