//! Aviation Edge route provider.
//!
//! The `/flights` endpoint returns airport codes only, so hits are enriched
//! with city and country from the `/airportDatabase` endpoint. Airport
//! details are immutable for practical purposes and are cached for the life
//! of the process, negative results included, so each airport costs at most
//! one extra call.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{FlightNumber, RouteRecord};

use super::{LookupOutcome, ProviderInitError, RequestPacer};

/// Default base URL for the Aviation Edge API.
const DEFAULT_BASE_URL: &str = "https://aviation-edge.com/v2/public";

/// Configuration for the Aviation Edge client.
#[derive(Debug, Clone)]
pub struct AviationEdgeConfig {
    /// Aviation Edge API key (passed as a query parameter).
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Minimum spacing between flight lookups.
    pub min_interval: Duration,
    /// User-Agent header for outgoing requests.
    pub user_agent: String,
}

impl AviationEdgeConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            min_interval: Duration::from_millis(300),
            user_agent: "route-resolver/1.0 (LED matrix display)".to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the minimum inter-request spacing.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Aviation Edge API client.
pub struct AviationEdgeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pacer: RequestPacer,
    /// Airport code → (city, country), cached for the process lifetime.
    airports: RwLock<HashMap<String, (String, String)>>,
}

impl AviationEdgeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AviationEdgeConfig) -> Result<Self, ProviderInitError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            pacer: RequestPacer::new(config.min_interval),
            airports: RwLock::new(HashMap::new()),
        })
    }

    /// Look up the route for a single flight-number variant.
    pub async fn try_lookup(&self, flight: &FlightNumber) -> LookupOutcome {
        self.pacer.pace().await;

        let url = format!(
            "{}/flights?key={}&flightIcao={}",
            self.base_url, self.api_key, flight
        );

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(provider = "aviation_edge", error = %e, "request failed");
                return LookupOutcome::Transient;
            }
        };

        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return LookupOutcome::NotFound;
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return LookupOutcome::QuotaExceeded;
        }

        if !status.is_success() {
            debug!(
                provider = "aviation_edge",
                status = status.as_u16(),
                flight = %flight,
                "unexpected status"
            );
            return LookupOutcome::Transient;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(provider = "aviation_edge", error = %e, "failed to read body");
                return LookupOutcome::Transient;
            }
        };

        let payload: Value = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(provider = "aviation_edge", error = %e, "malformed response body");
                return LookupOutcome::Transient;
            }
        };

        // A miss comes back as an error object rather than a flight list.
        let Some((origin, destination)) = route_codes_from_payload(&payload) else {
            return LookupOutcome::NotFound;
        };

        let (origin_details, destination_details) = futures::future::join(
            self.airport_details(&origin),
            self.airport_details(&destination),
        )
        .await;

        LookupOutcome::Found(RouteRecord {
            origin,
            destination,
            origin_city: origin_details.0,
            origin_country: origin_details.1,
            destination_city: destination_details.0,
            destination_country: destination_details.1,
            extra: serde_json::Map::new(),
        })
    }

    /// City and country for an airport code, served from the process-level
    /// cache when possible. Lookup failures are cached as empty so a dead
    /// airport endpoint doesn't get re-queried for every flight.
    async fn airport_details(&self, code: &str) -> (String, String) {
        {
            let cache = self.airports.read().await;
            if let Some(details) = cache.get(code) {
                return details.clone();
            }
        }

        let details = self.fetch_airport_details(code).await;

        let mut cache = self.airports.write().await;
        cache.insert(code.to_owned(), details.clone());
        details
    }

    async fn fetch_airport_details(&self, code: &str) -> (String, String) {
        let url = format!(
            "{}/airportDatabase?key={}&codeIataAirport={}",
            self.base_url, self.api_key, code
        );

        let empty = (String::new(), String::new());

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(provider = "aviation_edge", error = %e, airport = code, "airport lookup failed");
                return empty;
            }
        };

        if !response.status().is_success() {
            debug!(
                provider = "aviation_edge",
                status = response.status().as_u16(),
                airport = code,
                "airport lookup status"
            );
            return empty;
        }

        let Ok(body) = response.text().await else {
            return empty;
        };
        let Ok(payload) = serde_json::from_str::<Value>(&body) else {
            return empty;
        };
        let Some(airport) = payload.as_array().and_then(|entries| entries.first()) else {
            return empty;
        };

        let name = airport
            .get("nameAirport")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim();
        let country = airport
            .get("codeIso2Country")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_owned();

        (clean_city_name(name), country)
    }
}

/// Origin/destination codes from a `/flights` response (first entry wins).
///
/// Returns `None` unless both codes are present: a one-sided answer is no
/// better than a miss for display purposes.
fn route_codes_from_payload(payload: &Value) -> Option<(String, String)> {
    let first = payload.as_array()?.first()?;

    let origin = first
        .pointer("/departure/iataCode")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    let destination = first
        .pointer("/arrival/iataCode")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();

    if origin.is_empty() || destination.is_empty() {
        return None;
    }

    Some((origin.to_owned(), destination.to_owned()))
}

/// Derive a display city name from an airport name.
///
/// `nameAirport` is sometimes a city, sometimes a full airport name;
/// "International Airport"-style suffixes and trailing parentheticals are
/// stripped. If the cleaned name collapses to nothing, the original wins.
fn clean_city_name(name: &str) -> String {
    let original = name.trim();
    let mut city = original;

    for suffix in ["international airport", "airport", "international"] {
        if let Some(head) = strip_suffix_ignore_ascii_case(city, suffix) {
            city = head.trim_end();
        }
    }

    if city.ends_with(')')
        && let Some(open) = city.rfind('(')
    {
        city = city[..open].trim_end();
    }

    if city.len() < 2 {
        original.to_owned()
    } else {
        city.to_owned()
    }
}

fn strip_suffix_ignore_ascii_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let idx = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(idx) {
        return None;
    }
    let (head, tail) = s.split_at(idx);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
