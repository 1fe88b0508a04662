//! Route resolution orchestration.
//!
//! One lookup call with defined precedence: durable store, then in-memory
//! cache, then the provider chain, with write-through on discovery. The
//! resolver owns all four pieces of state (store, cache, chain, warning
//! throttle); callers only ever see immutable [`RouteRecord`] values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::cache::RouteCache;
use crate::domain::{FlightNumber, RouteRecord};
use crate::providers::ProviderChain;
use crate::store::RouteStore;

/// Default suppression window for repeated "no route found" warnings.
const DEFAULT_WARN_COOLDOWN: Duration = Duration::from_secs(60);

/// The result of a resolution, tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Served from the durable route database.
    FromStore(RouteRecord),

    /// Served from the in-memory cache.
    FromCache(RouteRecord),

    /// Freshly discovered from an external provider.
    FromProvider(RouteRecord),

    /// No tier produced a complete route. Never cached; the next call for
    /// the same flight retries every tier.
    NotFound,
}

impl Resolution {
    /// The resolved route, if any.
    pub fn record(&self) -> Option<&RouteRecord> {
        match self {
            Resolution::FromStore(record)
            | Resolution::FromCache(record)
            | Resolution::FromProvider(record) => Some(record),
            Resolution::NotFound => None,
        }
    }

    /// Whether a route was resolved.
    pub fn is_found(&self) -> bool {
        self.record().is_some()
    }
}

/// Flight-route resolver.
///
/// Constructed once at process start; safe to share behind an `Arc` and
/// call from concurrent tasks.
pub struct RouteResolver {
    store: RouteStore,
    cache: RouteCache,
    providers: ProviderChain,
    warn_cooldown: Duration,
    unresolved_warnings: Mutex<HashMap<String, Instant>>,
}

impl RouteResolver {
    /// Create a resolver over the given tiers.
    pub fn new(store: RouteStore, cache: RouteCache, providers: ProviderChain) -> Self {
        Self {
            store,
            cache,
            providers,
            warn_cooldown: DEFAULT_WARN_COOLDOWN,
            unresolved_warnings: Mutex::new(HashMap::new()),
        }
    }

    /// Set the suppression window for repeated not-found warnings.
    pub fn with_warn_cooldown(mut self, cooldown: Duration) -> Self {
        self.warn_cooldown = cooldown;
        self
    }

    /// Resolve a raw callsign to a route.
    ///
    /// Never fails: malformed input, provider trouble, and persistence
    /// errors all degrade to `NotFound` or a served record, with the detail
    /// in the logs.
    pub async fn resolve(&self, raw: &str) -> Resolution {
        let flight = match FlightNumber::normalize(raw) {
            Ok(flight) => flight,
            Err(e) => {
                debug!(raw, error = %e, "rejecting flight identifier");
                return Resolution::NotFound;
            }
        };

        let variants = flight.variants();

        if let Some(record) = self.store.lookup(&variants).await {
            self.cache.insert(&flight, Arc::new(record.clone())).await;
            return Resolution::FromStore(record);
        }

        if let Some(record) = self.cache.lookup(&variants).await {
            return Resolution::FromCache((*record).clone());
        }

        if let Some((record, matched)) = self.providers.lookup(&variants).await {
            self.cache.insert(&flight, Arc::new(record.clone())).await;

            // The canonical identifier and the variant that matched are
            // persisted as independent first-writer-wins entries.
            if let Err(e) = self.store.record_discovered(&flight, &record).await {
                warn!(flight = %flight, error = %e, "failed to persist discovered route");
            }
            if matched != flight
                && let Err(e) = self.store.record_discovered(&matched, &record).await
            {
                warn!(flight = %matched, error = %e, "failed to persist discovered route");
            }

            debug!(
                flight = %flight,
                origin = %record.origin,
                destination = %record.destination,
                "route discovered"
            );
            return Resolution::FromProvider(record);
        }

        self.note_unresolved(&flight);
        Resolution::NotFound
    }

    /// Number of routes in the durable store.
    pub async fn store_len(&self) -> usize {
        self.store.len().await
    }

    /// Number of cached routes (for monitoring).
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Warn about an unresolvable flight, at most once per cool-down window
    /// per identifier.
    fn note_unresolved(&self, flight: &FlightNumber) {
        let mut warnings = lock(&self.unresolved_warnings);
        let now = Instant::now();

        let due = warnings
            .get(flight.as_str())
            .is_none_or(|last| now.duration_since(*last) >= self.warn_cooldown);

        if due {
            warn!(flight = %flight, "no route found at any tier");
            warnings.insert(flight.as_str().to_owned(), now);
        }
    }
}

fn lock(map: &Mutex<HashMap<String, Instant>>) -> MutexGuard<'_, HashMap<String, Instant>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}
