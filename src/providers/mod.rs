//! Geocoding provider adapters.
//!
//! Each provider implements [`Geocoder`]. The resolver only ever talks to the
//! trait, so the commercial and the open provider are interchangeable and can
//! be replaced with in-memory doubles.

pub mod google;
pub mod nominatim;

pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::{CountryScope, Credentials};

/// Default per-request timeout for provider calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One geocoding call as seen by a provider
#[derive(Debug, Clone, Copy)]
pub struct GeocodeRequest<'a> {
    /// Normalized query text
    pub query: &'a str,
    pub scope: &'a CountryScope,
    pub credentials: Option<&'a Credentials>,
}

/// Best candidate returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMatch {
    pub latitude: f64,
    pub longitude: f64,
    /// Address formatted by the provider
    pub address: String,
}

/// Failure while talking to a provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("no API key provided")]
    MissingCredentials,

    #[error("request denied: {0}")]
    Denied(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("service error: {0}")]
    Service(String),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Failures that fit none of the known provider error classes
    pub fn is_unexpected(&self) -> bool {
        matches!(self, ProviderError::Unexpected(_))
    }

    /// Map a non-success HTTP status to an error
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Denied(status.to_string())
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::QuotaExceeded(status.to_string()),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Timeout,
            _ => ProviderError::Status(status),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = err.status() {
            ProviderError::from_status(status)
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_redirect() {
            ProviderError::Transport(err.to_string())
        } else {
            ProviderError::Unexpected(err.to_string())
        }
    }
}

/// Capability shared by all geocoding providers
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Human-readable provider name used in diagnostics
    fn name(&self) -> &str;

    /// Resolve a query to its best match, or `None` when the provider has no
    /// candidate.
    async fn geocode(
        &self,
        request: &GeocodeRequest<'_>,
    ) -> std::result::Result<Option<ProviderMatch>, ProviderError>;
}

/// Build the HTTP client shared by the adapters
pub(crate) fn http_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<url::Url> {
    url::Url::parse(endpoint)
        .map_err(|e| Error::Config(format!("Invalid provider URL '{}': {}", endpoint, e)))
}

/// In-process fake provider servers for adapter tests.
#[cfg(test)]
pub(crate) mod testing {
    use axum::Router;

    /// Serve `router` on an ephemeral local port and return its base URL
    pub async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Serve a response whose headers arrive at once but whose body stalls
    /// after the first byte. Returns the base URL.
    pub async fn spawn_stalled_body() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\n\
                              Content-Type: application/json\r\n\
                              Content-Length: 100\r\n\r\n[",
                        )
                        .await;
                    let _ = socket.flush().await;
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                });
            }
        });
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ProviderError::from_status(StatusCode::FORBIDDEN),
            ProviderError::Denied(_)
        ));
        assert!(matches!(
            ProviderError::from_status(StatusCode::TOO_MANY_REQUESTS),
            ProviderError::QuotaExceeded(_)
        ));
        assert!(matches!(
            ProviderError::from_status(StatusCode::GATEWAY_TIMEOUT),
            ProviderError::Timeout
        ));
        assert!(matches!(
            ProviderError::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            ProviderError::Status(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[test]
    fn test_unexpected_flag() {
        assert!(ProviderError::Unexpected("boom".into()).is_unexpected());
        assert!(!ProviderError::Timeout.is_unexpected());
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(parse_endpoint("not a url"), Err(Error::Config(_))));
    }
}
