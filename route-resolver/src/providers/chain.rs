//! Ordered provider chain with per-provider quota circuit breaking.
//!
//! Providers are independent quota domains: a 429 from one blocks only that
//! provider, for a fixed cool-down, and the chain moves on to the next.
//! While blocked, a provider receives no requests at all, exploratory
//! variants included.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::{FlightNumber, RouteRecord};

use super::{LookupOutcome, Provider};

/// Configuration for the provider chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// How long a provider stays blocked after signalling quota exhaustion.
    pub quota_cooldown: Duration,

    /// When set, a miss from the first provider ends the chain — provided
    /// that provider actually took its turn. While it is cooling down the
    /// remaining providers are tried as usual.
    pub authoritative_first: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            quota_cooldown: Duration::from_secs(24 * 60 * 60),
            authoritative_first: false,
        }
    }
}

/// Per-provider circuit breaker state.
#[derive(Debug, Default)]
struct QuotaState {
    blocked_until: Option<Instant>,
    warned: bool,
}

struct ChainEntry {
    provider: Provider,
    quota: Mutex<QuotaState>,
}

impl ChainEntry {
    /// Whether the provider is in quota cool-down. Expired blocks are
    /// cleared here, re-arming the warning for the next trip.
    fn in_cooldown(&self, now: Instant) -> bool {
        let mut state = lock(&self.quota);
        match state.blocked_until {
            Some(until) if now < until => true,
            Some(_) => {
                *state = QuotaState::default();
                false
            }
            None => false,
        }
    }

    fn block(&self, until: Instant) {
        let mut state = lock(&self.quota);
        if !state.warned {
            warn!(
                provider = self.provider.name(),
                "provider quota exhausted, cooling down"
            );
            state.warned = true;
        }
        state.blocked_until = Some(until);
    }
}

fn lock(state: &Mutex<QuotaState>) -> MutexGuard<'_, QuotaState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered list of route providers, tried in configured priority order.
pub struct ProviderChain {
    entries: Vec<ChainEntry>,
    config: ChainConfig,
}

impl ProviderChain {
    /// Create a chain over the given providers, highest priority first.
    pub fn new(providers: Vec<Provider>, config: ChainConfig) -> Self {
        let entries = providers
            .into_iter()
            .map(|provider| ChainEntry {
                provider,
                quota: Mutex::new(QuotaState::default()),
            })
            .collect();

        Self { entries, config }
    }

    /// Number of configured providers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any providers are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Try each provider over each variant, first complete route wins.
    ///
    /// Returns the route together with the variant that produced it, so the
    /// caller can persist both the canonical identifier and the match.
    pub async fn lookup(&self, variants: &[FlightNumber]) -> Option<(RouteRecord, FlightNumber)> {
        for (idx, entry) in self.entries.iter().enumerate() {
            let name = entry.provider.name();

            if entry.in_cooldown(Instant::now()) {
                debug!(provider = name, "skipping provider in quota cool-down");
                continue;
            }

            let mut quota_tripped = false;

            'variants: for variant in variants {
                match entry.provider.try_lookup(variant).await {
                    LookupOutcome::Found(record) if record.is_complete() => {
                        return Some((record, variant.clone()));
                    }
                    LookupOutcome::Found(_) => {
                        debug!(provider = name, flight = %variant, "discarding incomplete route");
                    }
                    LookupOutcome::NotFound => {}
                    LookupOutcome::Transient => {
                        debug!(provider = name, flight = %variant, "transient provider error");
                    }
                    LookupOutcome::QuotaExceeded => {
                        entry.block(Instant::now() + self.config.quota_cooldown);
                        quota_tripped = true;
                        break 'variants;
                    }
                }
            }

            // An authoritative first provider that took its turn decides the
            // outcome; quota exhaustion instead falls through to the rest of
            // the chain.
            if self.config.authoritative_first && idx == 0 && !quota_tripped {
                return None;
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;

    fn variants(raw: &str) -> Vec<FlightNumber> {
        FlightNumber::normalize(raw).unwrap().variants()
    }

    #[tokio::test]
    async fn first_provider_wins() {
        let primary = MockProvider::new("primary").with_route("EK215", RouteRecord::new("DXB", "LAX"));
        let fallback =
            MockProvider::new("fallback").with_route("EK215", RouteRecord::new("XXX", "YYY"));

        let chain = ProviderChain::new(
            vec![
                Provider::Mock(primary.clone()),
                Provider::Mock(fallback.clone()),
            ],
            ChainConfig::default(),
        );

        let (record, matched) = chain.lookup(&variants("EK215")).await.unwrap();
        assert_eq!(record.origin, "DXB");
        assert_eq!(matched.as_str(), "EK215");
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn variants_tried_in_order() {
        // Provider only knows the IATA form.
        let mock = MockProvider::new("mock").with_route("EK215", RouteRecord::new("DXB", "LAX"));
        let chain = ProviderChain::new(vec![Provider::Mock(mock.clone())], ChainConfig::default());

        let (record, matched) = chain.lookup(&variants("UAE215")).await.unwrap();
        assert_eq!(record.origin, "DXB");
        assert_eq!(matched.as_str(), "EK215");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn quota_blocks_only_that_provider() {
        let exhausted = MockProvider::new("exhausted").with_default(LookupOutcome::QuotaExceeded);
        let healthy =
            MockProvider::new("healthy").with_route("EK215", RouteRecord::new("DXB", "LAX"));

        let chain = ProviderChain::new(
            vec![
                Provider::Mock(exhausted.clone()),
                Provider::Mock(healthy.clone()),
            ],
            ChainConfig::default(),
        );

        let (record, _) = chain.lookup(&variants("EK215")).await.unwrap();
        assert_eq!(record.origin, "DXB");
        // Quota ended the provider's turn after a single call.
        assert_eq!(exhausted.calls(), 1);

        // Subsequent lookups skip the blocked provider entirely.
        chain.lookup(&variants("QR817")).await;
        assert_eq!(exhausted.calls(), 1);
        assert!(healthy.calls() >= 2);
    }

    #[tokio::test]
    async fn quota_stops_variant_exploration() {
        let exhausted = MockProvider::new("exhausted").with_default(LookupOutcome::QuotaExceeded);
        let chain =
            ProviderChain::new(vec![Provider::Mock(exhausted.clone())], ChainConfig::default());

        // Two variants, but only one call before the breaker trips.
        assert!(chain.lookup(&variants("UAE215")).await.is_none());
        assert_eq!(exhausted.calls(), 1);
    }

    #[tokio::test]
    async fn expired_cooldown_allows_retry() {
        let exhausted = MockProvider::new("exhausted").with_default(LookupOutcome::QuotaExceeded);
        let config = ChainConfig {
            quota_cooldown: Duration::ZERO,
            ..ChainConfig::default()
        };
        let chain = ProviderChain::new(vec![Provider::Mock(exhausted.clone())], config);

        chain.lookup(&variants("EK215")).await;
        chain.lookup(&variants("EK215")).await;

        assert_eq!(exhausted.calls(), 2);
    }

    #[tokio::test]
    async fn authoritative_miss_short_circuits() {
        let primary = MockProvider::new("primary");
        let fallback =
            MockProvider::new("fallback").with_route("EK215", RouteRecord::new("DXB", "LAX"));

        let config = ChainConfig {
            authoritative_first: true,
            ..ChainConfig::default()
        };
        let chain = ProviderChain::new(
            vec![
                Provider::Mock(primary.clone()),
                Provider::Mock(fallback.clone()),
            ],
            config,
        );

        assert!(chain.lookup(&variants("EK215")).await.is_none());
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn authoritative_quota_falls_through() {
        let primary = MockProvider::new("primary").with_default(LookupOutcome::QuotaExceeded);
        let fallback =
            MockProvider::new("fallback").with_route("EK215", RouteRecord::new("DXB", "LAX"));

        let config = ChainConfig {
            authoritative_first: true,
            ..ChainConfig::default()
        };
        let chain = ProviderChain::new(
            vec![
                Provider::Mock(primary.clone()),
                Provider::Mock(fallback.clone()),
            ],
            config,
        );

        let (record, _) = chain.lookup(&variants("EK215")).await.unwrap();
        assert_eq!(record.origin, "DXB");
    }

    #[tokio::test]
    async fn incomplete_route_does_not_win() {
        let partial = MockProvider::new("partial")
            .with_outcome("EK215", LookupOutcome::Found(RouteRecord::new("DXB", "")));
        let complete =
            MockProvider::new("complete").with_route("EK215", RouteRecord::new("DXB", "LAX"));

        let chain = ProviderChain::new(
            vec![
                Provider::Mock(partial.clone()),
                Provider::Mock(complete.clone()),
            ],
            ChainConfig::default(),
        );

        let (record, _) = chain.lookup(&variants("EK215")).await.unwrap();
        assert!(record.is_complete());
        assert_eq!(complete.calls(), 1);
    }

    #[tokio::test]
    async fn transient_continues_to_next_provider() {
        let flaky = MockProvider::new("flaky").with_default(LookupOutcome::Transient);
        let healthy =
            MockProvider::new("healthy").with_route("EK215", RouteRecord::new("DXB", "LAX"));

        let chain = ProviderChain::new(
            vec![
                Provider::Mock(flaky.clone()),
                Provider::Mock(healthy.clone()),
            ],
            ChainConfig::default(),
        );

        let (record, _) = chain.lookup(&variants("EK215")).await.unwrap();
        assert_eq!(record.origin, "DXB");
        assert_eq!(flaky.calls(), 1);
    }

    #[tokio::test]
    async fn empty_chain_misses() {
        let chain = ProviderChain::new(Vec::new(), ChainConfig::default());
        assert!(chain.lookup(&variants("EK215")).await.is_none());
        assert!(chain.is_empty());
    }
}
