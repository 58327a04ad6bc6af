//! In-memory tabular input for batch runs.

use crate::models::{Confidence, GeocodeResult, MatchLevel};

/// Names of the result columns added to a processed table
pub const RESULT_COLUMNS: [&str; 5] = [
    "latitude",
    "longitude",
    "full_address",
    "match_level",
    "confidence",
];

/// A single input record plus its geocoding outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRow {
    values: Vec<String>,
    result: Option<GeocodeResult>,
}

impl BatchRow {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            result: None,
        }
    }

    /// Field value by column index; short rows yield `None`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn result(&self) -> Option<&GeocodeResult> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, result: Option<GeocodeResult>) {
        self.result = result;
    }

    pub fn latitude(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.longitude)
    }

    pub fn full_address(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.matched_address.as_str())
    }

    pub fn match_level(&self) -> Option<MatchLevel> {
        self.result.as_ref().map(|r| r.match_level)
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.result.as_ref().map(|r| r.confidence)
    }
}

/// Ordered rows with named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<BatchRow>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, values: Vec<String>) {
        self.rows.push(BatchRow::new(values));
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn rows(&self) -> &[BatchRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [BatchRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
