//! Resolved route record.

use serde::{Deserialize, Serialize};

/// The resolved origin/destination for a flight number.
///
/// Airport codes are IATA or ICAO as reported by the source; countries are
/// ISO 3166-1 alpha-2. A record is *complete* iff both airport codes are
/// present; only complete records are cached or persisted.
///
/// Unknown keys found on persisted entries are retained in `extra` so that
/// rewriting the route database never strips fields written by newer (or
/// hand-edited) versions of the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Origin airport code.
    #[serde(default)]
    pub origin: String,

    /// Destination airport code.
    #[serde(default)]
    pub destination: String,

    /// Origin city name.
    #[serde(default)]
    pub origin_city: String,

    /// Destination city name.
    #[serde(default)]
    pub destination_city: String,

    /// Origin country (ISO 3166-1 alpha-2).
    #[serde(default)]
    pub origin_country: String,

    /// Destination country (ISO 3166-1 alpha-2).
    #[serde(default)]
    pub destination_country: String,

    /// Unrecognised keys from the persisted entry, preserved on rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RouteRecord {
    /// Create a record with just the airport codes.
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// A record is complete iff both airport codes are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.origin.is_empty() && !self.destination.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness() {
        assert!(RouteRecord::new("DXB", "LAX").is_complete());
        assert!(!RouteRecord::new("DXB", "").is_complete());
        assert!(!RouteRecord::new("", "LAX").is_complete());
        assert!(!RouteRecord::default().is_complete());
    }

    #[test]
    fn deserialize_partial_entry() {
        let record: RouteRecord = serde_json::from_str(r#"{"origin": "DXB"}"#).unwrap();
        assert_eq!(record.origin, "DXB");
        assert_eq!(record.destination, "");
        assert!(!record.is_complete());
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let json = r#"{
            "origin": "DXB",
            "destination": "LAX",
            "origin_city": "Dubai",
            "destination_city": "Los Angeles",
            "origin_country": "AE",
            "destination_country": "US",
            "aircraft_type": "B77W"
        }"#;

        let record: RouteRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.extra["aircraft_type"], "B77W");

        let rewritten = serde_json::to_string(&record).unwrap();
        let reparsed: RouteRecord = serde_json::from_str(&rewritten).unwrap();
        assert_eq!(reparsed, record);
    }

    #[test]
    fn no_extra_keys_serializes_clean() {
        let record = RouteRecord::new("DOH", "DXB");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("extra"));
    }
}
