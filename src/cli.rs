//! Command-line interface parsing for LaunchWatch
//!
//! Handles the query selector and the flags that override environment
//! configuration for a single run.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::cache::QueryKind;
use crate::config::Config;

/// Records fetched by `past` when `--limit` is not given
pub const DEFAULT_PAST_LIMIT: u32 = 10;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// `--limit` must select at least one record
    #[error("Invalid limit: {0}. The limit must be at least 1")]
    InvalidLimit(u32),

    /// `--timeout` must be a positive number of seconds
    #[error("Invalid timeout: {0}. The timeout must be at least 1 second")]
    InvalidTimeout(u64),
}

/// Which query to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Query {
    /// All launches from today onward, soonest first
    #[default]
    All,
    /// Launches within two hours of their scheduled time
    Live,
    /// The soonest upcoming launch
    Next,
    /// Rocket stats, NASA's picture of the day and trivia
    Facts,
    /// Recent SpaceX launches with their outcome
    Past,
}

impl Query {
    /// The response cache entry backing this query, if any
    pub fn cache_kind(self) -> Option<QueryKind> {
        match self {
            Query::All => Some(QueryKind::All),
            Query::Live => Some(QueryKind::Live),
            Query::Next => Some(QueryKind::Next),
            Query::Facts | Query::Past => None,
        }
    }
}

/// LaunchWatch - Upcoming rocket launches from SpaceX and Launch Library 2
#[derive(Parser, Debug)]
#[command(name = "launchwatch")]
#[command(about = "Upcoming and live rocket launches as JSON")]
#[command(version)]
pub struct Cli {
    /// Query to run
    #[arg(value_enum, default_value_t = Query::All)]
    pub query: Query,

    /// Maximum records to print (for `past`, the number fetched)
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Keep polling and print each refreshed result
    ///
    /// `all` re-polls every 2 minutes and `live` every 30 seconds.
    #[arg(long)]
    pub watch: bool,

    /// Upstream request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// NASA API key (overrides NASA_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub nasa_key: Option<String>,

    /// Launch Library 2 API token (overrides LL2_API_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    pub ll2_token: Option<String>,
}

/// Validated settings derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub query: Query,
    /// Output cap; `None` prints everything
    pub limit: Option<usize>,
    pub pretty: bool,
    pub watch: bool,
    /// Overrides applied on top of the environment
    pub request_timeout: Option<Duration>,
    pub nasa_api_key: Option<String>,
    pub ll2_api_token: Option<String>,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Err(CliError)` if `--limit` or `--timeout` is zero
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let limit = match cli.limit {
            Some(0) => return Err(CliError::InvalidLimit(0)),
            Some(n) => Some(n as usize),
            None => None,
        };
        let request_timeout = match cli.timeout {
            Some(0) => return Err(CliError::InvalidTimeout(0)),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(StartupConfig {
            query: cli.query,
            limit,
            pretty: cli.pretty,
            watch: cli.watch,
            request_timeout,
            nasa_api_key: cli.nasa_key.clone(),
            ll2_api_token: cli.ll2_token.clone(),
        })
    }

    /// Layers the CLI overrides onto `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(key) = &self.nasa_api_key {
            config.nasa_api_key = key.clone();
        }
        if let Some(token) = &self.ll2_api_token {
            config.ll2_api_token = Some(token.clone());
        }
    }

    /// Number of past launches to request
    pub fn past_limit(&self) -> u32 {
        self.limit
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_PAST_LIMIT)
    }
}
