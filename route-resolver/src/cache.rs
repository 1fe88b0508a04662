//! In-memory caching layer for resolved routes.
//!
//! Absorbs repeated lookups for the same flight within a time window so the
//! provider chain is only consulted once per flight per hour. Purely a
//! latency optimization over the store and providers: losing the cache
//! causes a re-fetch, never a wrong answer.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{FlightNumber, RouteRecord};

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_capacity: 4096,
        }
    }
}

/// TTL cache of resolved routes, keyed by flight number.
pub struct RouteCache {
    routes: MokaCache<String, Arc<RouteRecord>>,
}

impl RouteCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &RouteCacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    /// Get a cached route for any of the given variants, in order.
    ///
    /// Expired entries are ignored.
    pub async fn lookup(&self, variants: &[FlightNumber]) -> Option<Arc<RouteRecord>> {
        for variant in variants {
            if let Some(record) = self.routes.get(variant.as_str()).await {
                return Some(record);
            }
        }
        None
    }

    /// Insert a route, unconditionally replacing any prior entry.
    pub async fn insert(&self, flight: &FlightNumber, record: Arc<RouteRecord>) {
        self.routes.insert(flight.as_str().to_owned(), record).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}
