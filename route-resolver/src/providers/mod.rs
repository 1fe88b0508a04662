//! External route providers.
//!
//! Each adapter turns one upstream API's quirks (response nesting, status
//! conventions, request pacing) into the shared four-outcome contract the
//! chain relies on. The chain itself only sees [`LookupOutcome`].

mod aerodatabox;
mod aviation_edge;
mod chain;
mod mock;

pub use aerodatabox::{AeroDataBoxClient, AeroDataBoxConfig};
pub use aviation_edge::{AviationEdgeClient, AviationEdgeConfig};
pub use chain::{ChainConfig, ProviderChain};
pub use mock::MockProvider;

use std::time::{Duration, Instant};

use crate::domain::{FlightNumber, RouteRecord};

/// Errors that can occur when constructing a provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderInitError {
    /// API key contains characters not valid in an HTTP header
    #[error("invalid API key format")]
    InvalidApiKey,

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outcome of a single provider lookup.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// The provider returned a usable, complete route.
    Found(RouteRecord),

    /// The provider has no data for this flight (e.g. HTTP 204).
    NotFound,

    /// The provider rejected the request for quota exhaustion (HTTP 429).
    QuotaExceeded,

    /// Timeout, malformed response, or unexpected status. Treated like
    /// `NotFound` for chain continuation, but logged separately.
    Transient,
}

/// A route provider.
///
/// Concrete adapters are dispatched through this enum; the mock variant is
/// shipped alongside the real clients so tests and offline development can
/// exercise the full chain.
pub enum Provider {
    AeroDataBox(AeroDataBoxClient),
    AviationEdge(AviationEdgeClient),
    Mock(MockProvider),
}

impl Provider {
    /// Provider name, for logging.
    pub fn name(&self) -> &str {
        match self {
            Provider::AeroDataBox(_) => "aerodatabox",
            Provider::AviationEdge(_) => "aviation_edge",
            Provider::Mock(mock) => mock.name(),
        }
    }

    /// Look up the route for a single flight-number variant.
    pub async fn try_lookup(&self, flight: &FlightNumber) -> LookupOutcome {
        match self {
            Provider::AeroDataBox(client) => client.try_lookup(flight).await,
            Provider::AviationEdge(client) => client.try_lookup(flight).await,
            Provider::Mock(mock) => mock.try_lookup(flight).await,
        }
    }
}

/// Enforces a minimum spacing between outgoing requests.
///
/// Local to each adapter: providers are independent quota domains and pace
/// themselves independently.
pub(crate) struct RequestPacer {
    min_interval: Duration,
    last_request: tokio::sync::Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: tokio::sync::Mutex::new(None),
        }
    }

    /// Wait until the minimum interval since the previous request has
    /// elapsed, then claim the current slot.
    pub(crate) async fn pace(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}
