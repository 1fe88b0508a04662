//! Flight number (callsign) type and variant expansion.

use std::fmt;

use super::airline;

/// Error returned when normalizing an invalid flight number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid flight number: {reason}")]
pub struct InvalidFlightNumber {
    reason: &'static str,
}

/// A normalized flight number (callsign), e.g. "EK215" or "UAE215".
///
/// Normalization trims whitespace and uppercases; the result is guaranteed
/// non-empty. The standard structural form is a 2-3 letter airline
/// designator, digits, and an optional single suffix letter — but
/// non-standard callsigns (e.g. "UAE8LT", bare registrations) are accepted
/// as-is rather than rejected, since they still identify a flight and may
/// match a persisted route.
///
/// # Examples
///
/// ```
/// use route_resolver::domain::FlightNumber;
///
/// let fnum = FlightNumber::normalize(" ek215 ").unwrap();
/// assert_eq!(fnum.as_str(), "EK215");
///
/// // Empty input is rejected
/// assert!(FlightNumber::normalize("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FlightNumber(String);

impl FlightNumber {
    /// Normalize a raw callsign: trim, uppercase, reject empty.
    pub fn normalize(raw: &str) -> Result<Self, InvalidFlightNumber> {
        let cleaned = raw.trim().to_uppercase();

        if cleaned.is_empty() {
            return Err(InvalidFlightNumber {
                reason: "empty after trimming",
            });
        }

        Ok(FlightNumber(cleaned))
    }

    /// Returns the flight number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into airline designator and numeric tail, if the callsign has
    /// the standard structure: 2-3 uppercase letters, then digits, then an
    /// optional single trailing letter.
    ///
    /// Returns `None` for non-standard callsigns.
    pub fn airline_and_tail(&self) -> Option<(&str, &str)> {
        let s = self.0.as_str();

        let prefix_len = s.bytes().take_while(u8::is_ascii_uppercase).count();
        if !(2..=3).contains(&prefix_len) {
            return None;
        }

        let tail = &s[prefix_len..];
        let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }

        let suffix = &tail[digits..];
        if !suffix.is_empty() && !(suffix.len() == 1 && suffix.as_bytes()[0].is_ascii_uppercase()) {
            return None;
        }

        Some((&s[..prefix_len], tail))
    }

    /// The ordered list of identifier variants worth looking up, original
    /// first, deduplicated.
    ///
    /// If the callsign carries a 3-letter ICAO airline designator with a
    /// known IATA equivalent, the IATA-prefixed variant (tail unchanged) is
    /// appended. Non-standard callsigns yield the singleton.
    pub fn variants(&self) -> Vec<FlightNumber> {
        let mut out = vec![self.clone()];

        if let Some((designator, tail)) = self.airline_and_tail()
            && designator.len() == 3
            && let Some(iata) = airline::icao_to_iata(designator)
        {
            let swapped = FlightNumber(format!("{iata}{tail}"));
            if swapped != *self {
                out.push(swapped);
            }
        }

        out
    }
}

impl fmt::Debug for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlightNumber({})", self.0)
    }
}

impl fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_uppercases() {
        let fnum = FlightNumber::normalize("  uae215 ").unwrap();
        assert_eq!(fnum.as_str(), "UAE215");
    }

    #[test]
    fn reject_empty() {
        assert!(FlightNumber::normalize("").is_err());
        assert!(FlightNumber::normalize("   ").is_err());
        assert!(FlightNumber::normalize("\t\n").is_err());
    }

    #[test]
    fn split_standard_callsigns() {
        let fnum = FlightNumber::normalize("EK215").unwrap();
        assert_eq!(fnum.airline_and_tail(), Some(("EK", "215")));

        let fnum = FlightNumber::normalize("UAE215").unwrap();
        assert_eq!(fnum.airline_and_tail(), Some(("UAE", "215")));

        let fnum = FlightNumber::normalize("BAW123A").unwrap();
        assert_eq!(fnum.airline_and_tail(), Some(("BAW", "123A")));
    }

    #[test]
    fn split_rejects_nonstandard() {
        // Two letters after the digits
        let fnum = FlightNumber::normalize("UAE8LT").unwrap();
        assert_eq!(fnum.airline_and_tail(), None);

        // No digits
        let fnum = FlightNumber::normalize("UAEX").unwrap();
        assert_eq!(fnum.airline_and_tail(), None);

        // Prefix too long
        let fnum = FlightNumber::normalize("ABCD123").unwrap();
        assert_eq!(fnum.airline_and_tail(), None);

        // Prefix too short
        let fnum = FlightNumber::normalize("A123").unwrap();
        assert_eq!(fnum.airline_and_tail(), None);
    }

    #[test]
    fn variants_expand_known_icao() {
        let fnum = FlightNumber::normalize("uae215").unwrap();
        let variants = fnum.variants();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].as_str(), "UAE215");
        assert_eq!(variants[1].as_str(), "EK215");
    }

    #[test]
    fn variants_keep_suffix_letter() {
        let fnum = FlightNumber::normalize("QTR817A").unwrap();
        let variants = fnum.variants();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].as_str(), "QR817A");
    }

    #[test]
    fn variants_singleton_for_unknown_icao() {
        let fnum = FlightNumber::normalize("XYZ999").unwrap();
        assert_eq!(fnum.variants(), vec![fnum]);
    }

    #[test]
    fn variants_singleton_for_iata_prefix() {
        // Already a 2-letter IATA designator; nothing to translate.
        let fnum = FlightNumber::normalize("EK215").unwrap();
        assert_eq!(fnum.variants(), vec![fnum]);
    }

    #[test]
    fn variants_singleton_for_nonstandard() {
        let fnum = FlightNumber::normalize("UAE8LT").unwrap();
        assert_eq!(fnum.variants(), vec![fnum]);
    }

    #[test]
    fn display_and_debug() {
        let fnum = FlightNumber::normalize("EK215").unwrap();
        assert_eq!(format!("{}", fnum), "EK215");
        assert_eq!(format!("{:?}", fnum), "FlightNumber(EK215)");
    }
}
