//! The query surface: launch queries behind the shared response cache
//!
//! `LaunchService` owns every client and both cache tiers. A miss in the
//! response cache runs the aggregator and stores its result before returning.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::Aggregator;
use crate::cache::{CachedResult, QueryKind, ResponseCache, SourceCache};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::data::{
    ApodClient, HttpTransport, Launch, Ll2Client, ReqwestTransport, RocketFact, SpaceXClient,
    SpaceXLaunch,
};
use crate::error::SourceError;
use crate::facts::FactsGenerator;
use crate::normalize::normalize_spacex_past;

/// Where a query result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    /// Served from the shared response cache
    ServerCache,
    /// Computed by a fresh aggregation
    Api,
}

/// Result of the `all` and `live` queries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchesResponse {
    pub launches: Vec<Launch>,
    pub cached: bool,
    pub source: ResponseSource,
}

/// Result of the `next` query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextLaunchResponse {
    pub launch: Option<Launch>,
    pub cached: bool,
    pub source: ResponseSource,
}

/// Entry point used by front ends
///
/// Every method is total: upstream failures surface as empty lists or `None`.
#[derive(Debug, Clone)]
pub struct LaunchService {
    aggregator: Aggregator,
    spacex: SpaceXClient,
    facts: FactsGenerator,
    responses: ResponseCache,
}

impl LaunchService {
    /// Builds the service over the real HTTP stack and system clock
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        Ok(Self::new(config, transport, Arc::new(SystemClock)))
    }

    /// Builds the service over an arbitrary transport and clock
    pub fn new(config: &Config, transport: Arc<dyn HttpTransport>, clock: Arc<dyn Clock>) -> Self {
        let cache = SourceCache::new(clock.clone());

        let spacex =
            SpaceXClient::with_base_url(transport.clone(), cache.clone(), &config.spacex_base_url);
        let mut ll2 = Ll2Client::with_base_url(transport.clone(), cache.clone(), &config.ll2_base_url);
        if let Some(token) = &config.ll2_api_token {
            ll2 = ll2.with_api_token(token);
        }
        let apod = ApodClient::with_base_url(transport, cache, &config.nasa_base_url)
            .with_api_key(&config.nasa_api_key);

        let aggregator = Aggregator::new(spacex.clone(), ll2, clock.clone())
            .with_per_source_cap(config.per_source_cap)
            .with_ll2_limit(config.ll2_limit);

        Self {
            aggregator,
            facts: FactsGenerator::new(spacex.clone(), apod),
            spacex,
            responses: ResponseCache::with_ttl(clock, config.response_ttl),
        }
    }

    /// All launches from today onward, with cache metadata
    pub async fn all_upcoming(&self) -> LaunchesResponse {
        self.launches_query(QueryKind::All).await
    }

    /// Launches inside the live window, with cache metadata
    pub async fn live(&self) -> LaunchesResponse {
        self.launches_query(QueryKind::Live).await
    }

    /// The soonest launch, with cache metadata
    ///
    /// An empty result is not cached, so the next call aggregates again.
    pub async fn next(&self) -> NextLaunchResponse {
        if let Some(CachedResult::Next(launch)) = self.responses.get(QueryKind::Next) {
            debug!(query = %QueryKind::Next, "response cache hit");
            return NextLaunchResponse {
                launch: Some(launch),
                cached: true,
                source: ResponseSource::ServerCache,
            };
        }

        info!(query = %QueryKind::Next, "response cache miss, aggregating");
        let launch = self.aggregator.next().await;
        match &launch {
            Some(found) => self
                .responses
                .set(QueryKind::Next, CachedResult::Next(found.clone())),
            None => debug!(query = %QueryKind::Next, "no launch found, not caching"),
        }
        NextLaunchResponse {
            launch,
            cached: false,
            source: ResponseSource::Api,
        }
    }

    /// All launches from today onward, soonest first
    pub async fn get_all_upcoming_launches(&self) -> Vec<Launch> {
        self.all_upcoming().await.launches
    }

    /// Launches currently inside the live window
    pub async fn get_live_launches(&self) -> Vec<Launch> {
        self.live().await.launches
    }

    /// The soonest launch, if any
    pub async fn get_next_launch(&self) -> Option<Launch> {
        self.next().await.launch
    }

    /// Rocket stats, today's APOD and trivia
    pub async fn get_rocket_facts(&self) -> Vec<RocketFact> {
        self.facts.generate().await
    }

    /// Raw SpaceX past launches, newest first
    pub async fn get_spacex_past_launches(&self, limit: u32) -> Vec<SpaceXLaunch> {
        self.spacex.fetch_past(limit).await
    }

    /// SpaceX past launches as `past-<id>` records, newest first
    ///
    /// Skips the live window and the day filter: status is the flight
    /// outcome and `is_live` is always false.
    pub async fn get_past_launches(&self, limit: u32) -> Vec<Launch> {
        self.get_spacex_past_launches(limit)
            .await
            .iter()
            .filter_map(normalize_spacex_past)
            .collect()
    }

    async fn launches_query(&self, kind: QueryKind) -> LaunchesResponse {
        if let Some(CachedResult::Launches(launches)) = self.responses.get(kind) {
            debug!(query = %kind, "response cache hit");
            return LaunchesResponse {
                launches,
                cached: true,
                source: ResponseSource::ServerCache,
            };
        }

        info!(query = %kind, "response cache miss, aggregating");
        let launches = match kind {
            QueryKind::Live => self.aggregator.live().await,
            _ => self.aggregator.all_upcoming().await,
        };
        self.responses
            .set(kind, CachedResult::Launches(launches.clone()));
        LaunchesResponse {
            launches,
            cached: false,
            source: ResponseSource::Api,
        }
    }
}
