//! Resolution output types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which provider/strategy produced a result.
///
/// Discriminants are fixed; new variants get new numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[repr(u8)]
pub enum MatchLevel {
    /// Best match from the primary (commercial) provider
    #[serde(rename = "GOOGLE_MATCH")]
    PrimaryMatch = 1,
    /// Full-address match from the secondary (open) provider
    #[serde(rename = "NOMINATIM_FULL")]
    SecondaryFullMatch = 2,
}

impl MatchLevel {
    pub fn confidence(&self) -> Confidence {
        match self {
            MatchLevel::PrimaryMatch => Confidence::High,
            MatchLevel::SecondaryFullMatch => Confidence::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLevel::PrimaryMatch => "GOOGLE_MATCH",
            MatchLevel::SecondaryFullMatch => "NOMINATIM_FULL",
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal quality signal shown to users (not a probability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully resolved address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    /// Canonical address as returned by the provider
    pub matched_address: String,
    pub match_level: MatchLevel,
    pub confidence: Confidence,
    /// The caller's input, untouched
    pub original_address: String,
}

impl GeocodeResult {
    /// Build a result; confidence follows from the match level.
    pub fn new(
        latitude: f64,
        longitude: f64,
        matched_address: String,
        match_level: MatchLevel,
        original_address: String,
    ) -> Self {
        Self {
            latitude,
            longitude,
            matched_address,
            match_level,
            confidence: match_level.confidence(),
            original_address,
        }
    }
}
