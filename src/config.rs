//! TOML configuration shared by the binaries.
//!
//! ```toml
//! [google]
//! api_key = "..."
//!
//! [nominatim]
//! user_agent = "my-company-geocoder/1.0"
//!
//! [http]
//! timeout_secs = 10
//!
//! [batch]
//! delay_secs = 1.0
//! ```
//!
//! Every section and key is optional.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::batch::DEFAULT_DELAY;
use crate::error::{Error, Result};
use crate::models::Credentials;
use crate::providers::{self, GoogleGeocoder, NominatimGeocoder};
use crate::resolver::Resolver;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub google: GoogleConfig,
    pub nominatim: NominatimConfig,
    pub http: HttpConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: providers::google::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: providers::nominatim::DEFAULT_BASE_URL.to_string(),
            user_agent: providers::nominatim::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: providers::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BatchConfig {
    pub delay_secs: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_DELAY.as_secs_f64(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
        config.batch_delay()?;
        Ok(config)
    }

    /// Primary provider credentials, if a non-blank key is configured
    pub fn credentials(&self) -> Option<Credentials> {
        self.google.api_key.clone().and_then(Credentials::new)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs.max(1))
    }

    pub fn batch_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.batch.delay_secs).map_err(|_| {
            Error::Config(format!(
                "Invalid batch delay: {} seconds",
                self.batch.delay_secs
            ))
        })
    }

    /// Resolver backed by the Google and Nominatim adapters
    pub fn build_resolver(&self) -> Result<Resolver> {
        let google = GoogleGeocoder::new(&self.google.base_url, self.timeout())?;
        let nominatim = NominatimGeocoder::new(
            &self.nominatim.base_url,
            &self.nominatim.user_agent,
            self.timeout(),
        )?;
        Ok(Resolver::new(Arc::new(google), Arc::new(nominatim)))
    }
}
