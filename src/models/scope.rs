//! Country scoping and provider credentials.

use std::fmt;
use std::str::FromStr;

use crate::countries::{self, Country, GLOBAL_CODE};
use crate::error::Error;

/// Optional country restriction applied to a geocoding query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountryScope {
    /// No constraint
    #[default]
    Global,
    /// Restricted to a single known country
    Country(Country),
}

impl CountryScope {
    /// Parse a scope code. `GLOBAL` (any case) or an empty code means no
    /// filter; anything else must be a known alpha-2 code.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        let code = code.trim();
        if code.is_empty() || code.eq_ignore_ascii_case(GLOBAL_CODE) {
            return Ok(CountryScope::Global);
        }
        countries::lookup(code).map(CountryScope::Country)
    }

    pub fn country(&self) -> Option<&Country> {
        match self {
            CountryScope::Global => None,
            CountryScope::Country(country) => Some(country),
        }
    }

    /// Code as presented to users (`GLOBAL` for no filter)
    pub fn code(&self) -> &'static str {
        match self {
            CountryScope::Global => GLOBAL_CODE,
            CountryScope::Country(country) => country.code,
        }
    }
}

impl FromStr for CountryScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for CountryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountryScope::Global => write!(f, "{}", countries::GLOBAL_LABEL),
            CountryScope::Country(country) => write!(f, "{} ({})", country.name, country.code),
        }
    }
}

/// API key for the primary (commercial) provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Wrap a key. Blank keys count as no credentials.
    pub fn new(api_key: impl Into<String>) -> Option<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            None
        } else {
            Some(Self { api_key })
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_scope() {
        assert_eq!(CountryScope::from_code("GLOBAL").unwrap(), CountryScope::Global);
        assert_eq!(CountryScope::from_code("global").unwrap(), CountryScope::Global);
        assert_eq!(CountryScope::from_code("").unwrap(), CountryScope::Global);
        assert!(CountryScope::Global.country().is_none());
        assert_eq!(CountryScope::Global.code(), "GLOBAL");
    }

    #[test]
    fn test_country_scope() {
        let scope: CountryScope = "fr".parse().unwrap();
        let country = scope.country().unwrap();
        assert_eq!(country.code, "FR");
        assert_eq!(country.name, "France");
        assert_eq!(scope.to_string(), "France (FR)");
    }

    #[test]
    fn test_unknown_scope() {
        assert!(matches!(
            CountryScope::from_code("ZZ"),
            Err(Error::UnknownCountryCode(_))
        ));
    }

    #[test]
    fn test_blank_credentials() {
        assert!(Credentials::new("").is_none());
        assert!(Credentials::new("   ").is_none());
        let creds = Credentials::new(" secret ").unwrap();
        assert_eq!(creds.api_key(), "secret");
        assert!(!format!("{:?}", creds).contains("secret"));
    }
}
