//! Error types shared across the crate

use thiserror::Error;

/// Errors that can occur when fetching from an upstream API
///
/// These never leave the public query surface: source clients log them and
/// fall back to cached data or an empty result.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed (connect, TLS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Transport failure reported without a reqwest error
    #[error("Transport failed: {0}")]
    Transport(String),

    /// Upstream answered with HTTP 429
    #[error("Rate limited by upstream")]
    RateLimited,

    /// Upstream answered with a non-2xx status other than 429
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Errors raised while assembling runtime configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value of the wrong shape
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
