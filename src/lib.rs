//! Alder - address geocoding with provider fallback
//!
//! This library provides the resolution engine shared by the `geocode` CLI and
//! the `server` HTTP binary: address normalization, the country directory,
//! provider adapters, the fallback resolver and the batch runner.

pub mod batch;
pub mod config;
pub mod countries;
pub mod error;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod report;
pub mod resolver;

pub use batch::{BatchProgress, BatchRunner, BatchSummary, Table};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Confidence, CountryScope, Credentials, GeocodeResult, MatchLevel};
pub use normalize::normalize;
pub use resolver::Resolver;
