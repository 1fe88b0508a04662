//! Flight route resolution engine.
//!
//! Answers "where is this flight going?" for a raw callsign: an ordered
//! lookup through the durable route database, the in-memory cache, and a
//! chain of rate-limited external providers, with ICAO/IATA airline-code
//! normalization along the way.

pub mod cache;
pub mod config;
pub mod domain;
pub mod providers;
pub mod resolver;
pub mod store;
