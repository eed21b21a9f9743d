//! Named breakers for operational tooling.
//!
//! # Responsibilities
//! - Map dependency names to their breakers
//! - Expose snapshots of every breaker (pull-only)
//! - Route administrative state overrides by name
//!
//! # Design Decisions
//! - Breakers are type-erased behind [`Inspect`]; requests still go
//!   through the typed `CircuitBreaker` the caller holds
//! - Concurrent map so inspection never blocks registration

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::resilience::state::BreakerState;

/// Type-erased view of a breaker.
pub trait Inspect: Send + Sync {
    fn name(&self) -> &str;
    fn snapshot(&self) -> BreakerSnapshot;
    fn force_state(&self, state: BreakerState);
}

impl<S: Send + Sync> Inspect for CircuitBreaker<S> {
    fn name(&self) -> &str {
        CircuitBreaker::name(self)
    }

    fn snapshot(&self) -> BreakerSnapshot {
        CircuitBreaker::snapshot(self)
    }

    fn force_state(&self, state: BreakerState) {
        self.set_state(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("breaker {0:?} is already registered")]
    Duplicate(String),

    #[error("no breaker named {0:?}")]
    NotFound(String),
}

/// Registry of breakers keyed by dependency name.
#[derive(Default)]
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<dyn Inspect>>,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a breaker under its own name.
    pub fn register(&self, breaker: Arc<dyn Inspect>) -> Result<(), RegistryError> {
        use dashmap::mapref::entry::Entry;

        let name = breaker.name().to_string();
        match self.breakers.entry(name) {
            Entry::Occupied(entry) => Err(RegistryError::Duplicate(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(breaker = %entry.key(), "Breaker registered");
                entry.insert(breaker);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Inspect>> {
        self.breakers.get(name).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Inspect>> {
        self.breakers.remove(name).map(|(_, breaker)| breaker)
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of every breaker, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snaps: Vec<BreakerSnapshot> =
            self.breakers.iter().map(|e| e.value().snapshot()).collect();
        snaps.sort_by(|a, b| a.name.cmp(&b.name));
        snaps
    }

    /// Administrative override by name.
    pub fn force_state(&self, name: &str, state: BreakerState) -> Result<(), RegistryError> {
        let breaker = self
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        breaker.force_state(state);
        Ok(())
    }
}

impl std::fmt::Debug for BreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerRegistry")
            .field("breakers", &self.names())
            .finish()
    }
}
