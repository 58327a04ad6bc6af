//! OpenStreetMap Nominatim adapter (secondary, open provider).
//!
//! Nominatim's usage policy asks for an identifying User-Agent and at most one
//! request per second; pacing is the batch runner's job.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{GeocodeRequest, Geocoder, ProviderError, ProviderMatch};
use crate::error::Result;
use crate::models::CountryScope;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "Alder/0.1 (address geocoder)";

/// Client for a Nominatim search endpoint
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(user_agent, timeout)?,
            endpoint: super::parse_endpoint(endpoint)?,
        })
    }

    fn request_url(&self, query: &str, scope: &CountryScope) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("format", "json")
                .append_pair("limit", "1")
                .append_pair("accept-language", "en");
            if let Some(country) = scope.country() {
                pairs.append_pair("countrycodes", &country.code.to_lowercase());
            }
        }
        url
    }
}

/// Always add the scope's country name; unlike the primary provider there is
/// no check for a name already present in the query.
pub fn scoped_query(query: &str, scope: &CountryScope) -> String {
    match scope.country() {
        Some(country) => format!("{}, {}", query, country.name),
        None => query.to_string(),
    }
}

fn first_match(places: Vec<NominatimPlace>) -> std::result::Result<Option<ProviderMatch>, ProviderError> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let latitude = place
        .lat
        .parse::<f64>()
        .map_err(|e| ProviderError::Malformed(format!("invalid lat '{}': {}", place.lat, e)))?;
    let longitude = place
        .lon
        .parse::<f64>()
        .map_err(|e| ProviderError::Malformed(format!("invalid lon '{}': {}", place.lon, e)))?;

    Ok(Some(ProviderMatch {
        latitude,
        longitude,
        address: place.display_name,
    }))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "Nominatim"
    }

    async fn geocode(
        &self,
        request: &GeocodeRequest<'_>,
    ) -> std::result::Result<Option<ProviderMatch>, ProviderError> {
        let query = scoped_query(request.query, request.scope);
        debug!("Nominatim geocode: {} (scope {})", query, request.scope.code());

        let response = self
            .client
            .get(self.request_url(&query, request.scope))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let places: Vec<NominatimPlace> = response.json().await?;

        first_match(places)
    }
}
