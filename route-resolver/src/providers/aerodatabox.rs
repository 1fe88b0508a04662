//! AeroDataBox (RapidAPI) route provider.
//!
//! Looks up a flight number via the date-templated endpoints, falling back
//! through yesterday's date and the search endpoint when today has no data.
//! The API's response shape varies by endpoint and plan — airport codes
//! appear nested under `departure.airport.iata`, flat under
//! `departure.iata`, or as plain strings — so extraction works over the raw
//! JSON value rather than a fixed DTO.

use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::domain::{FlightNumber, RouteRecord};

use super::{LookupOutcome, ProviderInitError, RequestPacer};

/// Default base URL for the AeroDataBox API.
const DEFAULT_BASE_URL: &str = "https://aerodatabox.p.rapidapi.com";

/// RapidAPI host header value.
const RAPIDAPI_HOST: &str = "aerodatabox.p.rapidapi.com";

/// Configuration for the AeroDataBox client.
#[derive(Debug, Clone)]
pub struct AeroDataBoxConfig {
    /// RapidAPI key.
    pub api_key: String,
    /// Base URL for the API (defaults to the RapidAPI gateway).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Minimum spacing between requests.
    pub min_interval: Duration,
    /// User-Agent header for outgoing requests.
    pub user_agent: String,
}

impl AeroDataBoxConfig {
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

/// AeroDataBox API client.
pub struct AeroDataBoxClient {
    http: reqwest::Client,
    base_url: String,
    pacer: RequestPacer,
}

impl AeroDataBoxClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AeroDataBoxConfig) -> Result<Self, ProviderInitError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ProviderInitError::InvalidApiKey)?;
        headers.insert(HeaderName::from_static("x-rapidapi-key"), api_key);
        headers.insert(
            HeaderName::from_static("x-rapidapi-host"),
            HeaderValue::from_static(RAPIDAPI_HOST),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            pacer: RequestPacer::new(config.min_interval),
        })
    }

    /// Look up the route for a single flight-number variant.
    ///
    /// Walks the endpoint ladder until one returns a usable body. 429 from
    /// any endpoint aborts immediately with `QuotaExceeded`.
    pub async fn try_lookup(&self, flight: &FlightNumber) -> LookupOutcome {
        let mut saw_transient = false;

        for url in self.endpoint_urls(flight) {
            self.pacer.pace().await;

            let response = match self.http.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    debug!(provider = "aerodatabox", error = %e, "request failed");
                    saw_transient = true;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::NO_CONTENT {
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                return LookupOutcome::QuotaExceeded;
            }

            if !status.is_success() {
                debug!(
                    provider = "aerodatabox",
                    status = status.as_u16(),
                    flight = %flight,
                    "unexpected status"
                );
                saw_transient = true;
                continue;
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(provider = "aerodatabox", error = %e, "failed to read body");
                    saw_transient = true;
                    continue;
                }
            };

            let payload: Value = match serde_json::from_str(&body) {
                Ok(payload) => payload,
                Err(e) => {
                    debug!(provider = "aerodatabox", error = %e, "malformed response body");
                    saw_transient = true;
                    continue;
                }
            };

            if let Some(record) = route_from_payload(&payload)
                && record.is_complete()
            {
                return LookupOutcome::Found(record);
            }
        }

        if saw_transient {
            LookupOutcome::Transient
        } else {
            LookupOutcome::NotFound
        }
    }

    /// The endpoint ladder for one variant: today's schedule, yesterday's,
    /// then the dateless search endpoint.
    fn endpoint_urls(&self, flight: &FlightNumber) -> Vec<String> {
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap_or(today);

        vec![
            format!(
                "{}/flights/number/{}/{}",
                self.base_url,
                flight,
                today.format("%Y-%m-%d")
            ),
            format!(
                "{}/flights/number/{}/{}",
                self.base_url,
                flight,
                yesterday.format("%Y-%m-%d")
            ),
            format!("{}/flights/search/number/{}", self.base_url, flight),
        ]
    }
}

/// Extract a route from a response payload.
///
/// The payload is either a flight object or an array of them (first entry
/// wins). Returns `None` when no airport code can be found at all; the
/// result may still be incomplete (one side only).
fn route_from_payload(payload: &Value) -> Option<RouteRecord> {
    let flight = match payload {
        Value::Array(items) => items.first()?,
        Value::Object(_) => payload,
        _ => return None,
    };

    let departure = first_key(flight, &["departure", "dep", "origin"]);
    let arrival = first_key(flight, &["arrival", "arr", "destination"]);

    let (mut origin, origin_city, origin_country) =
        departure.map(endpoint_fields).unwrap_or_default();
    let (mut destination, destination_city, destination_country) =
        arrival.map(endpoint_fields).unwrap_or_default();

    if origin.is_empty() {
        origin = first_string(flight, &["from", "From", "originIata", "departureIata"]);
    }
    if destination.is_empty() {
        destination = first_string(flight, &["to", "To", "destinationIata", "arrivalIata"]);
    }

    if origin.is_empty() && destination.is_empty() {
        return None;
    }

    Some(RouteRecord {
        origin,
        destination,
        origin_city,
        destination_city,
        origin_country,
        destination_country,
        extra: serde_json::Map::new(),
    })
}

/// Airport code, city, and country from one endpoint value, which may be a
/// plain string, a flat object, or an object nesting an `airport` object.
fn endpoint_fields(value: &Value) -> (String, String, String) {
    match value {
        Value::String(code) => (code.trim().to_owned(), String::new(), String::new()),
        Value::Object(_) => {
            if let Some(airport) = value.get("airport").filter(|a| a.is_object()) {
                (
                    first_string(airport, &["iata", "icao"]),
                    first_string(airport, &["municipalityName", "name"]),
                    first_string(airport, &["countryCode"]),
                )
            } else {
                (
                    first_string(value, &["iata", "icao", "iataCode"]),
                    String::new(),
                    String::new(),
                )
            }
        }
        _ => (String::new(), String::new(), String::new()),
    }
}

/// First present, non-null value among the given keys.
fn first_key<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find(|v| !v.is_null())
}

/// First non-empty string value among the given keys, trimmed.
fn first_string(value: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_builder() {
        let config = AeroDataBoxConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_timeout(5)
            .with_min_interval(Duration::ZERO);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.min_interval, Duration::ZERO);
    }

    #[test]
    fn client_creation() {
        assert!(AeroDataBoxClient::new(AeroDataBoxConfig::new("test-key")).is_ok());
    }

    #[test]
    fn parse_nested_airport_shape() {
        let payload = json!([{
            "departure": {
                "airport": {
                    "iata": "DXB",
                    "municipalityName": "Dubai",
                    "countryCode": "AE"
                }
            },
            "arrival": {
                "airport": {
                    "iata": "LAX",
                    "municipalityName": "Los Angeles",
                    "countryCode": "US"
                }
            }
        }]);

        let record = route_from_payload(&payload).unwrap();
        assert_eq!(record.origin, "DXB");
        assert_eq!(record.destination, "LAX");
        assert_eq!(record.origin_city, "Dubai");
        assert_eq!(record.destination_city, "Los Angeles");
        assert_eq!(record.origin_country, "AE");
        assert_eq!(record.destination_country, "US");
        assert!(record.is_complete());
    }

    #[test]
    fn parse_flat_shape() {
        let payload = json!({
            "departure": {"iata": "DOH"},
            "arrival": {"iataCode": "DXB"}
        });

        let record = route_from_payload(&payload).unwrap();
        assert_eq!(record.origin, "DOH");
        assert_eq!(record.destination, "DXB");
        assert_eq!(record.origin_city, "");
    }

    #[test]
    fn parse_string_endpoints() {
        let payload = json!({"dep": " DXB ", "arr": "BOM"});

        let record = route_from_payload(&payload).unwrap();
        assert_eq!(record.origin, "DXB");
        assert_eq!(record.destination, "BOM");
    }

    #[test]
    fn parse_direct_fields() {
        let payload = json!({"from": "DXB", "to": "LHR"});

        let record = route_from_payload(&payload).unwrap();
        assert_eq!(record.origin, "DXB");
        assert_eq!(record.destination, "LHR");
    }

    #[test]
    fn null_endpoint_falls_through() {
        let payload = json!({
            "departure": null,
            "dep": {"iata": "DXB"},
            "arrival": {"iata": "LAX"}
        });

        let record = route_from_payload(&payload).unwrap();
        assert_eq!(record.origin, "DXB");
    }

    #[test]
    fn icao_used_when_iata_missing() {
        let payload = json!({
            "departure": {"airport": {"icao": "OMDB"}},
            "arrival": {"airport": {"iata": "LAX"}}
        });

        let record = route_from_payload(&payload).unwrap();
        assert_eq!(record.origin, "OMDB");
    }

    #[test]
    fn one_sided_payload_is_incomplete() {
        let payload = json!({"departure": {"iata": "DXB"}});

        let record = route_from_payload(&payload).unwrap();
        assert!(!record.is_complete());
    }

    #[test]
    fn unusable_payloads_yield_none() {
        assert!(route_from_payload(&json!({})).is_none());
        assert!(route_from_payload(&json!([])).is_none());
        assert!(route_from_payload(&json!("no data")).is_none());
        assert!(route_from_payload(&json!({"status": "ok"})).is_none());
    }
}
