//! Core data models for the resolution engine.

pub mod result;
pub mod scope;

pub use result::{Confidence, GeocodeResult, MatchLevel};
pub use scope::{CountryScope, Credentials};
