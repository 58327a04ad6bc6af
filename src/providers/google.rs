//! Google Geocoding API adapter (primary, keyed provider).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{GeocodeRequest, Geocoder, ProviderError, ProviderMatch};
use crate::error::Result;
use crate::models::CountryScope;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const USER_AGENT: &str = "Alder/0.1 (address geocoder)";

/// Client for the Google Geocoding web service
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(USER_AGENT, timeout)?,
            endpoint: super::parse_endpoint(endpoint)?,
        })
    }

    fn request_url(&self, address: &str, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", api_key);
        url
    }
}

/// Add the scope's country name as a hint unless the query already mentions it.
pub fn scoped_query(query: &str, scope: &CountryScope) -> String {
    match scope.country() {
        Some(country) if !query.to_lowercase().contains(&country.name.to_lowercase()) => {
            format!("{}, {}", query, country.name)
        }
        _ => query.to_string(),
    }
}

fn interpret(response: GoogleResponse) -> std::result::Result<Option<ProviderMatch>, ProviderError> {
    let detail = || {
        response
            .error_message
            .clone()
            .unwrap_or_else(|| response.status.clone())
    };

    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(None),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
            return Err(ProviderError::QuotaExceeded(detail()))
        }
        "REQUEST_DENIED" => return Err(ProviderError::Denied(detail())),
        _ => return Err(ProviderError::Service(detail())),
    }

    Ok(response.results.into_iter().next().map(|r| ProviderMatch {
        latitude: r.geometry.location.lat,
        longitude: r.geometry.location.lng,
        address: r.formatted_address,
    }))
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    fn name(&self) -> &str {
        "Google Maps API"
    }

    async fn geocode(
        &self,
        request: &GeocodeRequest<'_>,
    ) -> std::result::Result<Option<ProviderMatch>, ProviderError> {
        let credentials = request
            .credentials
            .ok_or(ProviderError::MissingCredentials)?;

        let address = scoped_query(request.query, request.scope);
        debug!("Google geocode: {}", address);

        let response = self
            .client
            .get(self.request_url(&address, credentials.api_key()))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let body: GoogleResponse = response.json().await?;

        interpret(body)
    }
}
