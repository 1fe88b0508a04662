//! Resolver settings and wiring.
//!
//! Settings live in a JSON file, matching the config format of the display
//! system this resolver serves. Every field has a default so a missing or
//! partial file still yields a working resolver — without API keys it simply
//! answers from the durable store alone.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{RouteCache, RouteCacheConfig};
use crate::providers::{
    AeroDataBoxClient, AeroDataBoxConfig, AviationEdgeClient, AviationEdgeConfig, ChainConfig,
    Provider, ProviderChain, ProviderInitError,
};
use crate::resolver::RouteResolver;
use crate::store::{RouteStore, StoreConfig, StoreError};

/// Errors that can occur when loading settings or building the resolver.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON
    #[error("failed to parse settings: {message}")]
    Parse { message: String },

    /// Route database failed to open
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Provider client construction failed
    #[error(transparent)]
    Provider(#[from] ProviderInitError),
}

/// Resolver settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Path to the durable route database.
    pub database_path: PathBuf,

    /// Start with an empty database (preserving the damaged file) instead
    /// of failing when the persisted database is corrupt.
    pub start_empty_on_corrupt: bool,

    /// In-memory cache TTL in seconds.
    pub cache_ttl_secs: u64,

    /// In-memory cache capacity.
    pub cache_capacity: u64,

    /// Provider quota cool-down in hours.
    pub quota_cooldown_hours: u64,

    /// Which provider resolves routes: "aviation_edge" or "aerodatabox".
    pub route_api_provider: String,

    /// Aviation Edge API key.
    pub aviation_edge_key: Option<String>,

    /// RapidAPI key for AeroDataBox.
    pub rapidapi_key: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Minimum spacing between provider requests, in milliseconds.
    pub min_request_interval_ms: u64,

    /// User-Agent for outgoing requests.
    pub user_agent: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/flight_routes.json"),
            start_empty_on_corrupt: false,
            cache_ttl_secs: 3600,
            cache_capacity: 4096,
            quota_cooldown_hours: 24,
            route_api_provider: "aviation_edge".to_owned(),
            aviation_edge_key: None,
            rapidapi_key: None,
            request_timeout_secs: 10,
            min_request_interval_ms: 300,
            user_agent: "route-resolver/1.0 (LED matrix display)".to_owned(),
        }
    }
}

/// Load settings from a JSON file.
///
/// Unknown keys are ignored, so the resolver can share a settings file with
/// the rest of the display system.
pub fn load_settings(path: impl AsRef<Path>) -> Result<ResolverSettings, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
        message: e.to_string(),
    })
}

/// Build a resolver from settings: open the store, size the cache, and wire
/// the provider chain in priority order.
pub fn build_resolver(settings: &ResolverSettings) -> Result<RouteResolver, ConfigError> {
    let store = RouteStore::open(
        StoreConfig::new(&settings.database_path)
            .with_start_empty_on_corrupt(settings.start_empty_on_corrupt),
    )?;

    let cache = RouteCache::new(&RouteCacheConfig {
        ttl: Duration::from_secs(settings.cache_ttl_secs),
        max_capacity: settings.cache_capacity,
    });

    let (providers, authoritative_first) = build_providers(settings)?;

    let chain = ProviderChain::new(
        providers,
        ChainConfig {
            quota_cooldown: Duration::from_secs(settings.quota_cooldown_hours * 60 * 60),
            authoritative_first,
        },
    );

    Ok(RouteResolver::new(store, cache, chain))
}

/// The provider list in priority order, plus whether the head of the list is
/// authoritative.
///
/// A configured Aviation Edge key makes it the authoritative primary — the
/// dedicated route provider replaces the legacy AeroDataBox fallback, which
/// is then only consulted while the primary is cooling down.
fn build_providers(settings: &ResolverSettings) -> Result<(Vec<Provider>, bool), ConfigError> {
    let min_interval = Duration::from_millis(settings.min_request_interval_ms);
    let mut providers = Vec::new();
    let mut authoritative_first = false;

    if settings.route_api_provider == "aviation_edge"
        && let Some(key) = &settings.aviation_edge_key
    {
        let config = AviationEdgeConfig::new(key.as_str())
            .with_timeout(settings.request_timeout_secs)
            .with_min_interval(min_interval)
            .with_user_agent(settings.user_agent.as_str());
        providers.push(Provider::AviationEdge(AviationEdgeClient::new(config)?));
        authoritative_first = true;
    }

    if let Some(key) = &settings.rapidapi_key {
        let config = AeroDataBoxConfig::new(key.as_str())
            .with_timeout(settings.request_timeout_secs)
            .with_min_interval(min_interval)
            .with_user_agent(settings.user_agent.as_str());
        providers.push(Provider::AeroDataBox(AeroDataBoxClient::new(config)?));
    }

    Ok((providers, authoritative_first))
}
