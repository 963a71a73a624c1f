//! Runtime configuration
//!
//! Settings come from the environment, optionally seeded from a `.env` file in
//! the working directory. Only `API_KEY` is required; everything else has a
//! default. Command-line flags are applied on top (see `cli`).

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::data::client::{ApiConfig, RetryPolicy, DEFAULT_BASE_URL};
use crate::data::Market;

/// Default cache lifetime, matching how long pool data stays useful
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1800;

/// Default interval between automatic refreshes
pub const DEFAULT_REFRESH_SECS: u64 = 300;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API key is missing or empty
    #[error("API_KEY is not set; export it or add it to a .env file")]
    MissingApiKey,

    /// A variable is set but cannot be used
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },

    /// The given env file could not be read
    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API settings
    pub api: ApiConfig,
    /// How long a market snapshot stays fresh
    pub cache_ttl: Duration,
    /// Interval between automatic refreshes of the open market
    pub refresh_interval: Duration,
    /// Market opened at startup
    pub market: Market,
}

impl Config {
    /// Loads `.env` (if present) and then reads the process environment
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::from_env()
    }

    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration from an env file, falling back to the process
    /// environment for variables the file does not set
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let vars = dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?;
        Self::from_lookup(|name| {
            vars.get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
        })
    }

    /// Builds the configuration from a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let retry = RetryPolicy {
            max_retries: parse_var(&lookup, "DEXDASH_MAX_RETRIES", 3)?,
            ..RetryPolicy::default()
        };

        let api = ApiConfig {
            base_url: lookup("COVALENT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            page_size: parse_positive(&lookup, "DEXDASH_PAGE_SIZE", 100)?,
            max_pages: parse_positive(&lookup, "DEXDASH_MAX_PAGES", 50)?,
            request_timeout: Duration::from_secs(parse_positive(
                &lookup,
                "DEXDASH_REQUEST_TIMEOUT_SECS",
                30,
            )?),
            max_concurrent_requests: parse_positive(&lookup, "DEXDASH_MAX_CONCURRENT_REQUESTS", 4)?,
            retry,
        };

        Ok(Self {
            api,
            cache_ttl: Duration::from_secs(parse_positive(
                &lookup,
                "DEXDASH_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?),
            refresh_interval: Duration::from_secs(parse_positive(
                &lookup,
                "DEXDASH_REFRESH_SECS",
                DEFAULT_REFRESH_SECS,
            )?),
            market: Market::default(),
        })
    }
}

/// Parses variable `name`, or returns `default` when it is unset
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
    }
}

/// Like `parse_var`, but zero is rejected
fn parse_positive<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialOrd + ToString,
{
    let value = parse_var(lookup, name, default)?;
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = Config::from_lookup(lookup_from(&[("API_KEY", "ckey_123")]))
            .expect("Config should load");

        assert_eq!(config.api.api_key, "ckey_123");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.max_pages, 50);
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.api.max_concurrent_requests, 4);
        assert_eq!(config.api.retry.max_retries, 3);
        assert_eq!(config.cache_ttl, Duration::from_secs(1800));
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.market, Market::default());
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let result = Config::from_lookup(lookup_from(&[("API_KEY", "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("COVALENT_BASE_URL", "http://localhost:9000/v1"),
            ("DEXDASH_PAGE_SIZE", "25"),
            ("DEXDASH_MAX_PAGES", "8"),
            ("DEXDASH_CACHE_TTL_SECS", "60"),
            ("DEXDASH_REQUEST_TIMEOUT_SECS", " 5 "),
            ("DEXDASH_MAX_CONCURRENT_REQUESTS", "2"),
            ("DEXDASH_MAX_RETRIES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:9000/v1");
        assert_eq!(config.api.page_size, 25);
        assert_eq!(config.api.max_pages, 8);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.api.request_timeout, Duration::from_secs(5));
        assert_eq!(config.api.max_concurrent_requests, 2);
        assert_eq!(config.api.retry.max_retries, 0);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("DEXDASH_PAGE_SIZE", "lots"),
        ]));

        match result {
            Err(ConfigError::InvalidValue { name, value }) => {
                assert_eq!(name, "DEXDASH_PAGE_SIZE");
                assert_eq!(value, "lots");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("DEXDASH_MAX_PAGES", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("DEXDASH_CACHE_TTL_SECS", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_from_env_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(".env");
        fs::write(
            &path,
            "API_KEY=ckey_from_file\nDEXDASH_CACHE_TTL_SECS=120\n# comment\n",
        )
        .expect("Should write env file");

        let config = Config::from_env_file(&path).expect("Config should load from file");

        assert_eq!(config.api.api_key, "ckey_from_file");
        assert_eq!(config.cache_ttl, Duration::from_secs(120));
    }

    #[test]
    fn test_from_missing_env_file_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = Config::from_env_file(&temp_dir.path().join("absent.env"));
        assert!(matches!(result, Err(ConfigError::EnvFile(_))));
    }
}
