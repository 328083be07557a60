//! NASA Astronomy Picture of the Day client

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::fetch_cached;
use super::http::HttpTransport;
use crate::cache::SourceCache;

/// Default base URL for api.nasa.gov
pub const NASA_BASE_URL: &str = "https://api.nasa.gov";

/// Key accepted by api.nasa.gov with a low shared quota
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Cache key for today's picture
const APOD_CACHE_KEY: &str = "nasa_apod";

/// The picture changes once a day
const APOD_TTL_HOURS: i64 = 24;

const SOURCE: &str = "nasa";

/// Astronomy Picture of the Day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apod {
    pub date: String,
    pub title: String,
    pub explanation: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub hdurl: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub service_version: Option<String>,
}

/// Client for the APOD endpoint
#[derive(Debug, Clone)]
pub struct ApodClient {
    transport: Arc<dyn HttpTransport>,
    cache: SourceCache,
    base_url: String,
    api_key: String,
}

impl ApodClient {
    /// Creates a client using `DEMO_KEY`
    pub fn new(transport: Arc<dyn HttpTransport>, cache: SourceCache) -> Self {
        Self::with_base_url(transport, cache, NASA_BASE_URL)
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
            api_key: DEMO_API_KEY.to_string(),
        }
    }

    /// Uses `api_key` instead of `DEMO_KEY`
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Fetches today's picture, or `None` if unavailable and never cached
    pub async fn fetch_today(&self) -> Option<Apod> {
        fetch_cached(
            &self.cache,
            SOURCE,
            APOD_CACHE_KEY,
            Duration::hours(APOD_TTL_HOURS),
            move || async move {
                let url = format!("{}/planetary/apod?api_key={}", self.base_url, self.api_key);
                self.transport.get(&url, &[]).await?.json::<Apod>()
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::data::http::mock::MockTransport;
    use chrono::{TimeZone, Utc};

    const APOD_RESPONSE: &str = r#"{
        "date": "2025-06-01",
        "explanation": "A spiral galaxy seen edge-on.",
        "hdurl": "https://apod.nasa.gov/apod/image/2506/galaxy_hd.jpg",
        "media_type": "image",
        "service_version": "v1",
        "title": "Edge-On Spiral",
        "url": "https://apod.nasa.gov/apod/image/2506/galaxy.jpg"
    }"#;

    fn client(transport: Arc<MockTransport>) -> (ApodClient, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));
        let cache = SourceCache::new(clock.clone());
        (ApodClient::with_base_url(transport, cache, "http://nasa.test"), clock)
    }

    #[tokio::test]
    async fn test_fetch_today_parses_and_caches_for_a_day() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("/planetary/apod", 200, APOD_RESPONSE);
        let (client, clock) = client(transport.clone());

        let apod = client.fetch_today().await.expect("APOD should parse");
        clock.advance(Duration::hours(23));
        client.fetch_today().await;

        assert_eq!(apod.title, "Edge-On Spiral");
        assert_eq!(apod.media_type.as_deref(), Some("image"));
        assert_eq!(transport.calls_to("/planetary/apod"), 1);

        clock.advance(Duration::hours(1));
        client.fetch_today().await;
        assert_eq!(transport.calls_to("/planetary/apod"), 2);
    }

    #[tokio::test]
    async fn test_api_key_in_query() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("apod?api_key=abc123", 200, APOD_RESPONSE);
        let (client, _clock) = client(transport.clone());

        let apod = client.with_api_key("abc123").fetch_today().await;

        assert!(apod.is_some());
        assert_eq!(transport.calls_to("apod?api_key=abc123"), 1);
    }

    #[tokio::test]
    async fn test_forbidden_is_none() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("/planetary/apod", 403, r#"{"error": {"code": "API_KEY_INVALID"}}"#);
        let (client, _clock) = client(transport);

        assert!(client.fetch_today().await.is_none());
    }
}
