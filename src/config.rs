//! Runtime configuration
//!
//! Values come from defaults, then the process environment (a `.env` file is
//! loaded first when present), then CLI flags applied by the binary.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::{debug, warn};

use crate::aggregator::{DEFAULT_LL2_LIMIT, DEFAULT_PER_SOURCE_CAP};
use crate::cache::RESPONSE_TTL_MINUTES;
use crate::data::apod::{DEMO_API_KEY, NASA_BASE_URL};
use crate::data::ll2::LL2_BASE_URL;
use crate::data::spacex::SPACEX_BASE_URL;
use crate::error::ConfigError;

/// Default upper bound on a single upstream request
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings for the upstream clients and caches
#[derive(Debug, Clone)]
pub struct Config {
    pub spacex_base_url: String,
    pub ll2_base_url: String,
    /// Sent as `Authorization: Token <token>` to raise the LL2 quota
    pub ll2_api_token: Option<String>,
    pub nasa_base_url: String,
    pub nasa_api_key: String,
    /// Bound on every upstream request; a timeout counts as a failed fetch
    pub request_timeout: StdDuration,
    /// Page size requested from LL2
    pub ll2_limit: u32,
    /// Records each source contributes to the merged list
    pub per_source_cap: usize,
    /// Lifetime of shared response cache entries
    pub response_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spacex_base_url: SPACEX_BASE_URL.to_string(),
            ll2_base_url: LL2_BASE_URL.to_string(),
            ll2_api_token: None,
            nasa_base_url: NASA_BASE_URL.to_string(),
            nasa_api_key: DEMO_API_KEY.to_string(),
            request_timeout: StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
            ll2_limit: DEFAULT_LL2_LIMIT,
            per_source_cap: DEFAULT_PER_SOURCE_CAP,
            response_ttl: Duration::minutes(RESPONSE_TTL_MINUTES),
        }
    }
}

impl Config {
    /// Reads configuration from the environment, loading `.env` if present
    pub fn from_env() -> Result<Self, ConfigError> {
        report_dotenv(dotenvy::dotenv());
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults
    ///
    /// Recognised variables: `LAUNCHWATCH_SPACEX_URL`, `LAUNCHWATCH_LL2_URL`,
    /// `LL2_API_TOKEN`, `LAUNCHWATCH_NASA_URL`, `NASA_API_KEY`,
    /// `LAUNCHWATCH_TIMEOUT_SECS`, `LAUNCHWATCH_LL2_LIMIT`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("LAUNCHWATCH_SPACEX_URL") {
            config.spacex_base_url = url;
        }
        if let Some(url) = get("LAUNCHWATCH_LL2_URL") {
            config.ll2_base_url = url;
        }
        config.ll2_api_token = get("LL2_API_TOKEN");
        if let Some(url) = get("LAUNCHWATCH_NASA_URL") {
            config.nasa_base_url = url;
        }
        if let Some(key) = get("NASA_API_KEY") {
            config.nasa_api_key = key;
        }
        if let Some(raw) = get("LAUNCHWATCH_TIMEOUT_SECS") {
            let secs = parse_positive("LAUNCHWATCH_TIMEOUT_SECS", &raw)?;
            config.request_timeout = StdDuration::from_secs(secs);
        }
        if let Some(raw) = get("LAUNCHWATCH_LL2_LIMIT") {
            let limit = parse_positive("LAUNCHWATCH_LL2_LIMIT", &raw)?;
            config.ll2_limit = u32::try_from(limit).map_err(|_| ConfigError::InvalidValue {
                name: "LAUNCHWATCH_LL2_LIMIT",
                expected: "a positive integer",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}

/// Logs the outcome of loading `.env`; returns false only for a file that
/// exists but could not be read or parsed
fn report_dotenv(result: Result<PathBuf, dotenvy::Error>) -> bool {
    match result {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env");
            true
        }
        Err(e) if e.not_found() => {
            debug!("no .env file found");
            true
        }
        Err(e) => {
            warn!(error = %e, "failed to load .env, continuing with process environment");
            false
        }
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            name,
            expected: "a positive integer",
            value: raw.to_string(),
        }),
    }
}
