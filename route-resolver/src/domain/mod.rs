//! Domain types for flight route resolution.
//!
//! This module contains the core domain model types that represent
//! validated flight data. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod airline;
mod flight_number;
mod route;

pub use airline::icao_to_iata;
pub use flight_number::{FlightNumber, InvalidFlightNumber};
pub use route::RouteRecord;
