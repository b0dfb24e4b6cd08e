//! Startup configuration for the Alpha Vantage adapter.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CASHCYCLE_ALPHAVANTAGE_API_KEY` (then `ALPHAVANTAGE_API_KEY`) | `demo` |
//! | `CASHCYCLE_ALPHAVANTAGE_BASE_URL` | `https://www.alphavantage.co/query` |
//! | `CASHCYCLE_TIMEOUT_MS` | `5000` |
//! | `CASHCYCLE_RATE_LIMIT_PER_MINUTE` | `5` |

use std::env;

use crate::error::ConfigError;
use crate::provider_policy::ProviderPolicy;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEMO_API_KEY: &str = "demo";

const API_KEY_VARS: [&str; 2] = ["CASHCYCLE_ALPHAVANTAGE_API_KEY", "ALPHAVANTAGE_API_KEY"];
const BASE_URL_VAR: &str = "CASHCYCLE_ALPHAVANTAGE_BASE_URL";
const TIMEOUT_VAR: &str = "CASHCYCLE_TIMEOUT_MS";
const RATE_LIMIT_VAR: &str = "CASHCYCLE_RATE_LIMIT_PER_MINUTE";

#[derive(Clone, PartialEq)]
pub struct AlphaVantageConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub policy: ProviderPolicy,
}

impl std::fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: String::from(DEMO_API_KEY),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 5_000,
            policy: ProviderPolicy::alphavantage_default(),
        }
    }
}

impl AlphaVantageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        match API_KEY_VARS.into_iter().find_map(|name| read(name)) {
            Some(key) => config.api_key = key.trim().to_owned(),
            None => tracing::warn!(
                "no Alpha Vantage API key configured; using the 'demo' key, which only serves IBM"
            ),
        }

        if let Some(base_url) = read(BASE_URL_VAR) {
            config = config.with_base_url(base_url)?;
        }
        if let Some(raw) = read(TIMEOUT_VAR) {
            config.timeout_ms = parse_positive(TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = read(RATE_LIMIT_VAR) {
            let per_minute = parse_positive(RATE_LIMIT_VAR, &raw)?;
            config.policy = ProviderPolicy::alphavantage_per_minute(
                u32::try_from(per_minute).unwrap_or(u32::MAX),
            );
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl { value: base_url });
        }
        self.base_url = trimmed.to_owned();
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn uses_demo_key(&self) -> bool {
        self.api_key == DEMO_API_KEY
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_demo_key_and_free_tier() {
        let config = AlphaVantageConfig::from_lookup(lookup_from(&[])).expect("valid");

        assert!(config.uses_demo_key());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.policy.quota_limit, 5);
    }

    #[test]
    fn prefers_namespaced_key_over_generic_one() {
        let config = AlphaVantageConfig::from_lookup(lookup_from(&[
            ("ALPHAVANTAGE_API_KEY", "generic"),
            ("CASHCYCLE_ALPHAVANTAGE_API_KEY", "specific"),
        ]))
        .expect("valid");

        assert_eq!(config.api_key, "specific");
    }

    #[test]
    fn reads_overrides() {
        let config = AlphaVantageConfig::from_lookup(lookup_from(&[
            ("ALPHAVANTAGE_API_KEY", "k"),
            ("CASHCYCLE_ALPHAVANTAGE_BASE_URL", "http://127.0.0.1:9000/query/"),
            ("CASHCYCLE_TIMEOUT_MS", "1500"),
            ("CASHCYCLE_RATE_LIMIT_PER_MINUTE", "75"),
        ]))
        .expect("valid");

        assert_eq!(config.base_url, "http://127.0.0.1:9000/query");
        assert_eq!(config.timeout_ms, 1_500);
        assert_eq!(config.policy.quota_limit, 75);
    }

    #[test]
    fn rejects_zero_rate_limit() {
        let err = AlphaVantageConfig::from_lookup(lookup_from(&[(
            "CASHCYCLE_RATE_LIMIT_PER_MINUTE",
            "0",
        )]))
        .expect_err("must fail");

        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn rejects_base_url_without_scheme() {
        let err = AlphaVantageConfig::default()
            .with_base_url("www.alphavantage.co/query")
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = AlphaVantageConfig::default().with_api_key("very-secret");
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
