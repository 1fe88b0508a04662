//! Airline designator translation.
//!
//! ADS-B callsigns carry the 3-letter ICAO airline designator, while most
//! route APIs index flights by the 2-character IATA designator. This table
//! covers the carriers commonly seen overhead; unknown designators simply
//! don't expand.

/// ICAO → IATA airline designators, sorted by ICAO code for binary search.
const ICAO_TO_IATA: &[(&str, &str)] = &[
    ("AAL", "AA"), // American Airlines
    ("AAR", "OZ"), // Asiana Airlines
    ("ACA", "AC"), // Air Canada
    ("AFR", "AF"), // Air France
    ("AIC", "AI"), // Air India
    ("AMX", "AM"), // Aeromexico
    ("ANA", "NH"), // All Nippon Airways
    ("ANZ", "NZ"), // Air New Zealand
    ("AUA", "OS"), // Austrian
    ("AVA", "AV"), // Avianca
    ("AZA", "AZ"), // ITA Airways
    ("AZU", "AD"), // Azul
    ("BAW", "BA"), // British Airways
    ("BEL", "SN"), // Brussels Airlines
    ("CCA", "CA"), // Air China
    ("CES", "MU"), // China Eastern
    ("CMP", "CM"), // Copa Airlines
    ("CPA", "CX"), // Cathay Pacific
    ("CSN", "CZ"), // China Southern
    ("DAL", "DL"), // Delta Air Lines
    ("DLH", "LH"), // Lufthansa
    ("EIN", "EI"), // Aer Lingus
    ("ETD", "EY"), // Etihad Airways
    ("ETH", "ET"), // Ethiopian Airlines
    ("EZY", "U2"), // easyJet
    ("FDB", "FZ"), // FlyDubai
    ("FDX", "FX"), // FedEx
    ("FFT", "F9"), // Frontier Airlines
    ("FIN", "AY"), // Finnair
    ("GFA", "GF"), // Gulf Air
    ("GIA", "GA"), // Garuda Indonesia
    ("GLO", "G3"), // Gol
    ("GTI", "GT"), // Atlas Air
    ("IAW", "IA"), // Iraqi Airways
    ("IBE", "IB"), // Iberia
    ("IGO", "6E"), // IndiGo
    ("JAL", "JL"), // Japan Airlines
    ("JBU", "B6"), // JetBlue
    ("KAC", "KU"), // Kuwait Airways
    ("KAL", "KE"), // Korean Air
    ("KLM", "KL"), // KLM
    ("KQA", "KQ"), // Kenya Airways
    ("LAN", "LA"), // LATAM
    ("MAS", "MH"), // Malaysia Airlines
    ("MEA", "ME"), // Middle East Airlines
    ("MSR", "MS"), // EgyptAir
    ("NKS", "NK"), // Spirit Airlines
    ("OMA", "WY"), // Oman Air
    ("PAL", "PR"), // Philippine Airlines
    ("QFA", "QF"), // Qantas
    ("QTR", "QR"), // Qatar Airways
    ("RAM", "AT"), // Royal Air Maroc
    ("RJA", "RJ"), // Royal Jordanian
    ("RYR", "FR"), // Ryanair
    ("SAA", "SA"), // South African Airways
    ("SAS", "SK"), // Scandinavian Airlines
    ("SEJ", "SG"), // SpiceJet
    ("SIA", "SQ"), // Singapore Airlines
    ("SVA", "SV"), // Saudia
    ("SWA", "WN"), // Southwest Airlines
    ("SWR", "LX"), // Swiss
    ("THA", "TG"), // Thai Airways
    ("UAE", "EK"), // Emirates
    ("UAL", "UA"), // United Airlines
    ("UPS", "5X"), // UPS Airlines
    ("VIR", "VS"), // Virgin Atlantic
    ("VLG", "VY"), // Vueling
    ("VOZ", "VA"), // Virgin Australia
    ("WZZ", "W6"), // Wizz Air
];

/// Look up the IATA designator for a 3-letter ICAO airline code.
///
/// Returns `None` for designators outside the table.
pub fn icao_to_iata(icao: &str) -> Option<&'static str> {
    ICAO_TO_IATA
        .binary_search_by(|&(code, _)| code.cmp(&icao))
        .ok()
        .map(|idx| ICAO_TO_IATA[idx].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in ICAO_TO_IATA.windows(2) {
            assert!(
                pair[0].0 < pair[1].0,
                "table out of order: {} >= {}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn known_designators() {
        assert_eq!(icao_to_iata("UAE"), Some("EK"));
        assert_eq!(icao_to_iata("BAW"), Some("BA"));
        assert_eq!(icao_to_iata("IGO"), Some("6E"));
        assert_eq!(icao_to_iata("UPS"), Some("5X"));
        assert_eq!(icao_to_iata("WZZ"), Some("W6"));
    }

    #[test]
    fn unknown_designators() {
        assert_eq!(icao_to_iata("XXX"), None);
        assert_eq!(icao_to_iata("EK"), None);
        assert_eq!(icao_to_iata(""), None);
    }
}
