//! Error types for the geocoding engine.

/// Result alias for engine operations that can fail on caller input.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that propagate to the caller.
///
/// Provider failures never show up here; they are absorbed by the
/// [`Resolver`](crate::resolver::Resolver) and reported through a
/// [`Reporter`](crate::report::Reporter) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Country code not present in the country directory
    #[error("Unknown country code: {0}")]
    UnknownCountryCode(String),

    /// The requested address column does not exist in the table
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// CSV read or write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
