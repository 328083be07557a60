//! Core data models for LaunchWatch
//!
//! This module contains the canonical launch and fact types served to callers,
//! plus one client module per upstream API.

pub mod apod;
pub mod http;
pub mod ll2;
pub mod spacex;

pub use apod::{Apod, ApodClient};
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use ll2::{Ll2Client, Ll2Launch};
pub use spacex::{SpaceXClient, SpaceXLaunch, SpaceXRocket};

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::SourceCache;
use crate::error::SourceError;

/// A rocket launch, unified across upstream sources
///
/// `date` and `date_unix` always describe the same instant; both are private
/// and only change together through [`Launch::set_date`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LaunchRecord")]
pub struct Launch {
    /// Source-namespaced identifier (`spacex-…`, `ll2-…`, `past-…`)
    pub id: String,
    /// Mission or vehicle display name
    pub name: String,
    /// NET launch time
    date: DateTime<Utc>,
    /// `date` as Unix seconds
    date_unix: i64,
    /// Vehicle name
    pub rocket: String,
    /// Pad or site name
    pub launch_site: String,
    /// Launch status
    pub status: LaunchStatus,
    /// Webcast URL, if any
    pub livestream: Option<String>,
    /// Mission description, if any
    pub description: Option<String>,
    /// Whether the launch is inside the live window
    pub is_live: bool,
    /// Pad coordinates, if the source provides them
    pub location: Option<LaunchLocation>,
    /// Launch photo URL
    pub image: Option<String>,
    /// Mission patch URL
    pub mission_patch: Option<String>,
}

impl Launch {
    /// Creates a launch with placeholder vehicle/site and status `tbd`
    pub fn new(id: impl Into<String>, name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date,
            date_unix: date.timestamp(),
            rocket: crate::normalize::UNKNOWN_ROCKET.to_string(),
            launch_site: crate::normalize::UNKNOWN_SITE.to_string(),
            status: LaunchStatus::Tbd,
            livestream: None,
            description: None,
            is_live: false,
            location: None,
            image: None,
            mission_patch: None,
        }
    }

    /// NET launch time
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// NET launch time in Unix seconds
    pub fn date_unix(&self) -> i64 {
        self.date_unix
    }

    /// Moves the launch to `date`, recomputing `date_unix`
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
        self.date_unix = date.timestamp();
    }

    /// Absolute distance between the NET and `now`
    pub fn distance_from(&self, now: DateTime<Utc>) -> Duration {
        Duration::seconds((self.date_unix - now.timestamp()).abs())
    }
}

/// Wire form of [`Launch`]; `dateUnix` is optional and must match `date`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LaunchRecord {
    id: String,
    name: String,
    date: DateTime<Utc>,
    #[serde(default)]
    date_unix: Option<i64>,
    rocket: String,
    launch_site: String,
    status: LaunchStatus,
    #[serde(default)]
    livestream: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    is_live: bool,
    #[serde(default)]
    location: Option<LaunchLocation>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    mission_patch: Option<String>,
}

impl TryFrom<LaunchRecord> for Launch {
    type Error = String;

    fn try_from(record: LaunchRecord) -> Result<Self, Self::Error> {
        let date_unix = record.date.timestamp();
        if let Some(given) = record.date_unix.filter(|given| *given != date_unix) {
            return Err(format!(
                "dateUnix {given} does not match date {} ({date_unix})",
                record.date.to_rfc3339()
            ));
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            date: record.date,
            date_unix,
            rocket: record.rocket,
            launch_site: record.launch_site,
            status: record.status,
            livestream: record.livestream,
            description: record.description,
            is_live: record.is_live,
            location: record.location,
            image: record.image,
            mission_patch: record.mission_patch,
        })
    }
}

/// Launch status shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStatus {
    /// Scheduled and confirmed
    Upcoming,
    /// Inside the live window
    Live,
    /// Flew successfully
    Success,
    /// Flew and failed
    Failure,
    /// Date or go-status not confirmed
    Tbd,
}

/// Geographic location of a launch pad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchLocation {
    /// Site or region name
    pub name: String,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// ISO country code, if known
    pub country_code: Option<String>,
}

/// A single display fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RocketFact {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FactKind,
    pub title: String,
    pub value: String,
    pub source: FactSource,
}

/// Category of a [`RocketFact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Stat,
    Mission,
    Apod,
    Trivia,
}

/// Where a [`RocketFact`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactSource {
    SpaceX,
    Nasa,
    Ll2,
}

/// Runs `fetch` behind the per-source cache
///
/// # Behavior
/// - Returns the cached payload while it is younger than `ttl`
/// - Otherwise calls `fetch` and caches a successful result before returning it
/// - On any fetch failure, including HTTP 429, returns the last cached payload
///   regardless of age
/// - Returns `None` only when the fetch failed and nothing was ever cached
pub(crate) async fn fetch_cached<T, F, Fut>(
    cache: &SourceCache,
    source: &'static str,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Option<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    if let Some(data) = cache.get::<T>(key, ttl) {
        debug!(source, key, "serving fresh cache");
        return Some(data);
    }

    let error = match fetch().await {
        Ok(data) => {
            cache.set(key, &data);
            return Some(data);
        }
        Err(e) => e,
    };

    let stale = cache.get_stale::<T>(key);
    match (&error, stale.is_some()) {
        (SourceError::RateLimited, true) => {
            warn!(source, key, "rate limited, serving stale cache")
        }
        (SourceError::RateLimited, false) => {
            warn!(source, key, "rate limited and nothing cached yet")
        }
        (_, true) => warn!(source, key, error = %error, "fetch failed, serving stale cache"),
        (_, false) => warn!(source, key, error = %error, "fetch failed and nothing cached yet"),
    }
    stale
}

/// Decodes each record of a page on its own, dropping the ones that fail
///
/// One malformed record must not cost the rest of the page.
pub(crate) fn decode_records<T: DeserializeOwned>(
    source: &'static str,
    records: Vec<serde_json::Value>,
) -> Vec<T> {
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(source, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        warn!(source, skipped = total - decoded.len(), total, "dropped malformed records");
    }
    decoded
}
