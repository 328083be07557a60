//! Launch Library 2 API client
//!
//! The free tier allows roughly 15 requests per hour, so fresh reads are
//! cached for 30 minutes and an HTTP 429 is answered from the last good
//! payload instead of surfacing an error.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{decode_records, fetch_cached};
use super::http::HttpTransport;
use crate::cache::SourceCache;
use crate::error::SourceError;

/// Default base URL for Launch Library 2
pub const LL2_BASE_URL: &str = "https://ll.thespacedevs.com/2.2.0";

/// Fresh TTL, sized to stay under the hourly quota
const UPCOMING_TTL_MINUTES: i64 = 30;

const SOURCE: &str = "ll2";

/// A launch as returned by `/launch/upcoming/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ll2Launch {
    pub id: String,
    pub name: String,
    /// NET as an RFC 3339 timestamp
    pub net: String,
    #[serde(default)]
    pub window_start: Option<String>,
    #[serde(default)]
    pub window_end: Option<String>,
    #[serde(default)]
    pub status: Option<Ll2Status>,
    #[serde(default)]
    pub rocket: Option<Ll2Rocket>,
    #[serde(default)]
    pub pad: Option<Ll2Pad>,
    #[serde(default)]
    pub webcast_live: bool,
    #[serde(default, rename = "vidURLs")]
    pub vid_urls: Option<Vec<Ll2Video>>,
    #[serde(default)]
    pub mission: Option<Ll2Mission>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ll2Status {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbrev: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ll2Rocket {
    #[serde(default)]
    pub configuration: Option<Ll2RocketConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ll2RocketConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ll2Pad {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<Coordinate>,
    #[serde(default)]
    pub longitude: Option<Coordinate>,
    #[serde(default)]
    pub location: Option<Ll2PadLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ll2PadLocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// A coordinate, which LL2 encodes as a string on some endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    /// Degrees, if the value is a finite number
    pub fn degrees(&self) -> Option<f64> {
        let value = match self {
            Coordinate::Number(n) => *n,
            Coordinate::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ll2Video {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ll2Mission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Paginated envelope
#[derive(Debug, Deserialize)]
struct UpcomingResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Client for Launch Library 2
#[derive(Debug, Clone)]
pub struct Ll2Client {
    transport: Arc<dyn HttpTransport>,
    cache: SourceCache,
    base_url: String,
    api_token: Option<String>,
}

impl Ll2Client {
    /// Creates an anonymous client against the public API
    pub fn new(transport: Arc<dyn HttpTransport>, cache: SourceCache) -> Self {
        Self::with_base_url(transport, cache, LL2_BASE_URL)
    }

    /// Creates an anonymous client against a custom base URL
    pub fn with_base_url(
        transport: Arc<dyn HttpTransport>,
        cache: SourceCache,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            cache,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    /// Authenticates requests with an API token for a higher quota
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn cache_key(limit: u32) -> String {
        format!("ll2_upcoming_{limit}")
    }

    /// Fetches up to `limit` upcoming launches
    ///
    /// # Behavior
    /// - Serves the cached page while it is younger than 30 minutes
    /// - On HTTP 429 or any other failure, serves the last good page regardless
    ///   of age
    /// - Returns an empty list only when nothing has been cached yet
    pub async fn fetch_upcoming(&self, limit: u32) -> Vec<Ll2Launch> {
        fetch_cached(
            &self.cache,
            SOURCE,
            &Self::cache_key(limit),
            Duration::minutes(UPCOMING_TTL_MINUTES),
            move || self.fetch_from_api(limit),
        )
        .await
        .unwrap_or_default()
    }

    async fn fetch_from_api(&self, limit: u32) -> Result<Vec<Ll2Launch>, SourceError> {
        let url = format!("{}/launch/upcoming/?limit={}", self.base_url, limit);
        let headers: Vec<(&str, String)> = self
            .api_token
            .iter()
            .map(|token| ("Authorization", format!("Token {token}")))
            .collect();

        let response: UpcomingResponse = self.transport.get(&url, &headers).await?.json()?;
        Ok(decode_records(SOURCE, response.results))
    }
}
