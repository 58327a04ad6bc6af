//! Address resolution pipeline.
//!
//! Normalizes the input, asks the primary provider when credentials are
//! available, falls back to the secondary provider, and tags the outcome with
//! a match level and confidence.

use std::sync::Arc;
use tracing::debug;

use crate::models::{CountryScope, Credentials, GeocodeResult, MatchLevel};
use crate::normalize::normalize;
use crate::providers::{GeocodeRequest, Geocoder, ProviderError};
use crate::report::{LogReporter, Reporter};

/// Multi-provider resolver
#[derive(Clone)]
pub struct Resolver {
    primary: Arc<dyn Geocoder>,
    secondary: Arc<dyn Geocoder>,
    reporter: Arc<dyn Reporter>,
}

impl Resolver {
    /// Create a resolver that logs diagnostics through `tracing`
    pub fn new(primary: Arc<dyn Geocoder>, secondary: Arc<dyn Geocoder>) -> Self {
        Self {
            primary,
            secondary,
            reporter: Arc::new(LogReporter),
        }
    }

    /// Send warnings and errors to `reporter` instead
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Resolve a free-text address.
    ///
    /// `None` means neither provider found the address, or a provider failed
    /// in a way that was reported to the diagnostics channel. Provider
    /// failures never escape this call.
    pub async fn resolve(
        &self,
        address: &str,
        scope: &CountryScope,
        credentials: Option<&Credentials>,
    ) -> Option<GeocodeResult> {
        let query = normalize(address);
        debug!("Resolving '{}' as '{}'", address, query);

        let request = GeocodeRequest {
            query: &query,
            scope,
            credentials,
        };

        if credentials.is_some() {
            match self.primary.geocode(&request).await {
                Ok(Some(m)) => {
                    return Some(GeocodeResult::new(
                        m.latitude,
                        m.longitude,
                        m.address,
                        MatchLevel::PrimaryMatch,
                        address.to_string(),
                    ));
                }
                Ok(None) => {
                    debug!("{} found no match for '{}'", self.primary.name(), query);
                }
                Err(e) => {
                    let message = format!(
                        "{} error: {}, falling back to {}",
                        self.primary.name(),
                        e,
                        self.secondary.name()
                    );
                    if e.is_unexpected() {
                        self.reporter.error(&message);
                    } else {
                        self.reporter.warning(&message);
                    }
                }
            }
        }

        match self.secondary.geocode(&request).await {
            Ok(Some(m)) => Some(GeocodeResult::new(
                m.latitude,
                m.longitude,
                display_lines(&m.address),
                MatchLevel::SecondaryFullMatch,
                address.to_string(),
            )),
            Ok(None) => {
                debug!("{} found no match for '{}'", self.secondary.name(), query);
                None
            }
            Err(ProviderError::Timeout) => {
                debug!("{} timed out for '{}'", self.secondary.name(), query);
                None
            }
            Err(e) if e.is_unexpected() => {
                self.reporter
                    .error(&format!("Error processing address '{}': {}", address, e));
                None
            }
            Err(e) => {
                self.reporter.warning(&format!(
                    "{} error for '{}': {}",
                    self.secondary.name(),
                    address,
                    e
                ));
                None
            }
        }
    }
}

/// Render comma-separated address components one per line.
fn display_lines(address: &str) -> String {
    address
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Confidence;
    use crate::providers::ProviderMatch;
    use crate::report::{Collector, Severity};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted provider that records every request it sees
    pub(crate) struct MockGeocoder {
        name: &'static str,
        outcome: Box<dyn Fn(&str) -> Result<Option<ProviderMatch>, ProviderError> + Send + Sync>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockGeocoder {
        pub fn new(
            name: &'static str,
            outcome: impl Fn(&str) -> Result<Option<ProviderMatch>, ProviderError>
                + Send
                + Sync
                + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: Box::new(outcome),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn matching(name: &'static str, lat: f64, lon: f64, address: &str) -> Arc<Self> {
            let address = address.to_string();
            Self::new(name, move |_| {
                Ok(Some(ProviderMatch {
                    latitude: lat,
                    longitude: lon,
                    address: address.clone(),
                }))
            })
        }

        pub fn empty(name: &'static str) -> Arc<Self> {
            Self::new(name, |_| Ok(None))
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Geocoder for MockGeocoder {
        fn name(&self) -> &str {
            self.name
        }

        async fn geocode(
            &self,
            request: &GeocodeRequest<'_>,
        ) -> Result<Option<ProviderMatch>, ProviderError> {
            self.calls.lock().unwrap().push(request.query.to_string());
            (self.outcome)(request.query)
        }
    }

    fn creds() -> Credentials {
        Credentials::new("valid-key").unwrap()
    }

    #[tokio::test]
    async fn test_without_credentials_skips_primary() {
        let primary = MockGeocoder::matching("primary", 1.0, 1.0, "P");
        let secondary = MockGeocoder::matching("secondary", 2.0, 2.0, "S, T");
        let resolver = Resolver::new(primary.clone(), secondary.clone());

        let result = resolver
            .resolve("Somewhere", &CountryScope::Global, None)
            .await
            .unwrap();

        assert_eq!(primary.call_count(), 0);
        assert_eq!(secondary.call_count(), 1);
        assert_eq!(result.match_level, MatchLevel::SecondaryFullMatch);
        assert_eq!(result.matched_address, "S\nT");
    }

    #[tokio::test]
    async fn test_primary_match_is_high_confidence() {
        let primary = MockGeocoder::matching(
            "primary",
            37.4220,
            -122.0841,
            "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
        );
        let secondary = MockGeocoder::empty("secondary");
        let resolver = Resolver::new(primary.clone(), secondary.clone());
        let scope = CountryScope::from_code("US").unwrap();

        let result = resolver
            .resolve("1600 Amphitheatre Parkway", &scope, Some(&creds()))
            .await
            .unwrap();

        assert_eq!(result.match_level, MatchLevel::PrimaryMatch);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(
            result.matched_address,
            "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA"
        );
        assert_eq!(result.original_address, "1600 Amphitheatre Parkway");
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_primary_error_falls_back_to_secondary() {
        let primary = MockGeocoder::new("primary", |_| {
            Err(ProviderError::Denied("bad key".into()))
        });
        let secondary = MockGeocoder::matching("secondary", 48.8566, 2.3522, "Paris, France");
        let collector = Arc::new(Collector::new());
        let resolver =
            Resolver::new(primary.clone(), secondary.clone()).with_reporter(collector.clone());

        let result = resolver
            .resolve("Paris", &CountryScope::Global, Some(&creds()))
            .await
            .unwrap();

        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.match_level, MatchLevel::SecondaryFullMatch);
        assert_eq!(result.matched_address, "Paris\nFrance");
        assert_eq!(result.latitude, 48.8566);
        assert_eq!(result.longitude, 2.3522);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(collector.count(Severity::Warning), 1);
        assert!(collector.entries()[0].message.contains("falling back"));
    }

    #[tokio::test]
    async fn test_unexpected_primary_error_still_falls_back() {
        let primary = MockGeocoder::new("primary", |_| {
            Err(ProviderError::Unexpected("panic in parser".into()))
        });
        let secondary = MockGeocoder::matching("secondary", 3.0, 4.0, "Y");
        let collector = Arc::new(Collector::new());
        let resolver = Resolver::new(primary, secondary).with_reporter(collector.clone());

        let result = resolver
            .resolve("Y", &CountryScope::Global, Some(&creds()))
            .await
            .unwrap();

        assert_eq!(result.match_level, MatchLevel::SecondaryFullMatch);
        assert_eq!(collector.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_primary_no_match_falls_back_silently() {
        let primary = MockGeocoder::empty("primary");
        let secondary = MockGeocoder::matching("secondary", 1.0, 2.0, "X");
        let collector = Arc::new(Collector::new());
        let resolver = Resolver::new(primary, secondary.clone()).with_reporter(collector.clone());

        let result = resolver
            .resolve("X", &CountryScope::Global, Some(&creds()))
            .await;

        assert!(result.is_some());
        assert_eq!(secondary.call_count(), 1);
        assert!(collector.entries().is_empty());
    }

    #[tokio::test]
    async fn test_providers_receive_normalized_query() {
        let primary = MockGeocoder::empty("primary");
        let secondary = MockGeocoder::empty("secondary");
        let resolver = Resolver::new(primary.clone(), secondary.clone());

        let result = resolver
            .resolve("  221-B  Baker St., London ", &CountryScope::Global, Some(&creds()))
            .await;

        assert!(result.is_none());
        assert_eq!(primary.calls.lock().unwrap()[0], "221 B Baker St London");
        assert_eq!(secondary.calls.lock().unwrap()[0], "221 B Baker St London");
    }

    #[tokio::test]
    async fn test_secondary_timeout_is_silent_none() {
        let secondary = MockGeocoder::new("secondary", |_| Err(ProviderError::Timeout));
        let collector = Arc::new(Collector::new());
        let resolver = Resolver::new(MockGeocoder::empty("primary"), secondary)
            .with_reporter(collector.clone());

        assert!(resolver
            .resolve("Anywhere", &CountryScope::Global, None)
            .await
            .is_none());
        assert!(collector.entries().is_empty());
    }

    #[tokio::test]
    async fn test_secondary_body_stall_is_silent_none() {
        use crate::providers::nominatim::{NominatimGeocoder, DEFAULT_USER_AGENT};
        use crate::providers::testing::spawn_stalled_body;
        use std::time::Duration;

        let base = spawn_stalled_body().await;
        let secondary = NominatimGeocoder::new(
            &format!("{}/search", base),
            DEFAULT_USER_AGENT,
            Duration::from_millis(300),
        )
        .unwrap();
        let collector = Arc::new(Collector::new());
        let resolver = Resolver::new(MockGeocoder::empty("primary"), Arc::new(secondary))
            .with_reporter(collector.clone());

        assert!(resolver
            .resolve("Paris", &CountryScope::Global, None)
            .await
            .is_none());
        assert!(collector.entries().is_empty());
    }

    #[tokio::test]
    async fn test_secondary_failures_are_reported() {
        let secondary = MockGeocoder::new("secondary", |query| {
            if query == "odd" {
                Err(ProviderError::Unexpected("boom".into()))
            } else {
                Err(ProviderError::Malformed("not json".into()))
            }
        });
        let collector = Arc::new(Collector::new());
        let resolver = Resolver::new(MockGeocoder::empty("primary"), secondary)
            .with_reporter(collector.clone());

        assert!(resolver.resolve("odd", &CountryScope::Global, None).await.is_none());
        assert!(resolver.resolve("even", &CountryScope::Global, None).await.is_none());

        let entries = collector.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].severity, Severity::Error);
        assert_eq!(entries[1].severity, Severity::Warning);
    }

    #[test]
    fn test_display_lines() {
        assert_eq!(display_lines("Paris, France"), "Paris\nFrance");
        assert_eq!(
            display_lines("10, Downing Street,Westminster, London"),
            "10\nDowning Street\nWestminster\nLondon"
        );
        assert_eq!(display_lines("Nowhere"), "Nowhere");
    }
}
