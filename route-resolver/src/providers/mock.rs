//! Scripted mock provider for testing without API access.
//!
//! Serves pre-programmed outcomes per flight number and counts lookups, so
//! tests can assert exactly how many provider calls a resolution made.
//! Clones share the call counter.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{FlightNumber, RouteRecord};

use super::LookupOutcome;

/// Mock provider with scripted per-flight outcomes.
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    outcomes: HashMap<String, LookupOutcome>,
    default_outcome: LookupOutcome,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock that answers `NotFound` for everything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcomes: HashMap::new(),
            default_outcome: LookupOutcome::NotFound,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script a found route for a specific flight number.
    pub fn with_route(mut self, flight: &str, record: RouteRecord) -> Self {
        self.outcomes
            .insert(flight.to_owned(), LookupOutcome::Found(record));
        self
    }

    /// Script an arbitrary outcome for a specific flight number.
    pub fn with_outcome(mut self, flight: &str, outcome: LookupOutcome) -> Self {
        self.outcomes.insert(flight.to_owned(), outcome);
        self
    }

    /// Set the outcome returned for unscripted flight numbers.
    pub fn with_default(mut self, outcome: LookupOutcome) -> Self {
        self.default_outcome = outcome;
        self
    }

    /// Number of lookups made against this mock (shared across clones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Provider name, for logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mimics the real adapters' lookup interface.
    pub async fn try_lookup(&self, flight: &FlightNumber) -> LookupOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.outcomes
            .get(flight.as_str())
            .unwrap_or(&self.default_outcome)
            .clone()
    }
}
