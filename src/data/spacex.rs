//! SpaceX API client
//!
//! Launches come from the `/launches/query` endpoint with `rocket` and
//! `launchpad` populated; rocket metadata from `/rockets`.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{decode_records, fetch_cached};
use super::http::HttpTransport;
use crate::cache::SourceCache;
use crate::error::SourceError;

/// Default base URL for the SpaceX v4 API
pub const SPACEX_BASE_URL: &str = "https://api.spacexdata.com/v4";

/// Cache key for upcoming launches
const UPCOMING_CACHE_KEY: &str = "spacex_upcoming";

/// Cache key for rocket metadata
const ROCKETS_CACHE_KEY: &str = "spacex_rockets";

/// Fresh TTL for upcoming launches
const UPCOMING_TTL_MINUTES: i64 = 5;

/// Fresh TTL for past launches
const PAST_TTL_MINUTES: i64 = 60;

/// Fresh TTL for rocket metadata
const ROCKETS_TTL_HOURS: i64 = 24;

const SOURCE: &str = "spacex";

/// A field the API returns either as a bare id or as the populated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Embedded<T> {
    /// Populated document
    Object(T),
    /// Unpopulated reference
    Id(String),
}

/// The naming fields of a populated rocket or launchpad document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// A launch as returned by the SpaceX API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceXLaunch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date_utc: Option<String>,
    #[serde(default)]
    pub date_unix: Option<i64>,
    #[serde(default)]
    pub rocket: Option<Embedded<EmbeddedRef>>,
    #[serde(default)]
    pub launchpad: Option<Embedded<EmbeddedRef>>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub links: SpaceXLinks,
    #[serde(default)]
    pub upcoming: bool,
}

/// Media links attached to a SpaceX launch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceXLinks {
    #[serde(default)]
    pub webcast: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub wikipedia: Option<String>,
    #[serde(default)]
    pub patch: Option<SpaceXPatch>,
    #[serde(default)]
    pub flickr: Option<SpaceXFlickr>,
}

/// Mission patch images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceXPatch {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Flickr photo sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceXFlickr {
    #[serde(default)]
    pub small: Vec<String>,
    #[serde(default)]
    pub original: Vec<String>,
}

/// Rocket metadata as returned by `/rockets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceXRocket {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub stages: Option<u32>,
    #[serde(default)]
    pub success_rate_pct: Option<f64>,
    #[serde(default)]
    pub first_flight: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub height: Option<Length>,
    #[serde(default)]
    pub diameter: Option<Length>,
    #[serde(default)]
    pub mass: Option<Mass>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A length in both unit systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub meters: Option<f64>,
    pub feet: Option<f64>,
}

/// A mass in both unit systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mass {
    pub kg: Option<f64>,
    pub lb: Option<f64>,
}

/// Paginated envelope returned by `/launches/query`
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    docs: Vec<serde_json::Value>,
}

/// Client for the SpaceX API
#[derive(Debug, Clone)]
pub struct SpaceXClient {
    transport: Arc<dyn HttpTransport>,
    cache: SourceCache,
    base_url: String,
}

impl SpaceXClient {
    /// Creates a client against the public API
    pub fn new(transport: Arc<dyn HttpTransport>, cache: SourceCache) -> Self {
        Self::with_base_url(transport, cache, SPACEX_BASE_URL)
    }

    /// Creates a client against a custom base URL
    pub fn with_base_url(
        transport: Arc<dyn HttpTransport>,
        cache: SourceCache,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            cache,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetches upcoming launches, soonest first
    ///
    /// Never fails: on upstream errors the last cached payload is returned,
    /// or an empty list if nothing was cached yet.
    pub async fn fetch_upcoming(&self) -> Vec<SpaceXLaunch> {
        let query = json!({
            "query": { "upcoming": true },
            "options": {
                "populate": ["rocket", "launchpad"],
                "sort": { "date_unix": "asc" }
            }
        });

        fetch_cached(
            &self.cache,
            SOURCE,
            UPCOMING_CACHE_KEY,
            Duration::minutes(UPCOMING_TTL_MINUTES),
            move || self.query_launches(query),
        )
        .await
        .unwrap_or_default()
    }

    /// Fetches the `limit` most recent past launches, newest first
    pub async fn fetch_past(&self, limit: u32) -> Vec<SpaceXLaunch> {
        let query = json!({
            "query": { "upcoming": false },
            "options": {
                "populate": ["rocket", "launchpad"],
                "sort": { "date_unix": "desc" },
                "limit": limit
            }
        });

        fetch_cached(
            &self.cache,
            SOURCE,
            &format!("spacex_past_{limit}"),
            Duration::minutes(PAST_TTL_MINUTES),
            move || self.query_launches(query),
        )
        .await
        .unwrap_or_default()
    }

    /// Fetches metadata for every rocket
    pub async fn fetch_rockets(&self) -> Vec<SpaceXRocket> {
        fetch_cached(
            &self.cache,
            SOURCE,
            ROCKETS_CACHE_KEY,
            Duration::hours(ROCKETS_TTL_HOURS),
            move || async move {
                let url = format!("{}/rockets", self.base_url);
                self.transport.get(&url, &[]).await?.json::<Vec<SpaceXRocket>>()
            },
        )
        .await
        .unwrap_or_default()
    }

    async fn query_launches(&self, query: serde_json::Value) -> Result<Vec<SpaceXLaunch>, SourceError> {
        let url = format!("{}/launches/query", self.base_url);
        let response: QueryResponse = self.transport.post_json(&url, &query).await?.json()?;
        Ok(decode_records(SOURCE, response.docs))
    }
}
