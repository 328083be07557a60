//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use launchwatch::clock::ManualClock;
use launchwatch::data::{HttpResponse, HttpTransport};
use launchwatch::error::SourceError;
use launchwatch::{Config, LaunchService};

pub const SPACEX_LAUNCHES: &str = "/launches/query";
pub const SPACEX_ROCKETS: &str = "/rockets";
pub const LL2_UPCOMING: &str = "/launch/upcoming/";
pub const NASA_APOD: &str = "/planetary/apod";

/// Transport whose replies can be swapped between calls
///
/// Each pattern keeps one current reply; `None` means the upstream is down.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<&'static str, Option<HttpResponse>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, pattern: &'static str, status: u16, body: impl Into<String>) {
        let response = HttpResponse {
            status,
            body: body.into(),
        };
        self.replies.lock().unwrap().insert(pattern, Some(response));
    }

    pub fn go_down(&self, pattern: &'static str) {
        self.replies.lock().unwrap().insert(pattern, None);
    }

    pub fn calls(&self, pattern: &'static str) -> usize {
        self.calls.lock().unwrap().get(pattern).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn answer(&self, url: &str) -> Result<HttpResponse, SourceError> {
        let replies = self.replies.lock().unwrap();
        let matched = replies.iter().find(|(pattern, _)| url.contains(*pattern));
        let Some((pattern, reply)) = matched else {
            return Err(SourceError::Transport(format!("no route for {url}")));
        };
        *self.calls.lock().unwrap().entry(*pattern).or_default() += 1;
        reply
            .clone()
            .ok_or_else(|| SourceError::Transport(format!("{pattern} is down")))
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, _headers: &[(&str, String)]) -> Result<HttpResponse, SourceError> {
        self.answer(url)
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
    ) -> Result<HttpResponse, SourceError> {
        self.answer(url)
    }
}

/// 2025-06-01 10:00 UTC
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        spacex_base_url: "http://spacex.test/v4".to_string(),
        ll2_base_url: "http://ll2.test/2.2.0".to_string(),
        nasa_base_url: "http://nasa.test".to_string(),
        ..Config::default()
    }
}

pub fn setup() -> (LaunchService, Arc<ScriptedTransport>, Arc<ManualClock>) {
    let transport = ScriptedTransport::new();
    let clock = Arc::new(ManualClock::new(start()));
    let service = LaunchService::new(&test_config(), transport.clone(), clock.clone());
    (service, transport, clock)
}

/// SpaceX `/launches/query` body with one populated launch per `(id, time)`
pub fn spacex_page(launches: &[(&str, DateTime<Utc>)]) -> String {
    let docs: Vec<_> = launches
        .iter()
        .map(|(id, at)| {
            json!({
                "id": id,
                "name": format!("Starlink {id}"),
                "date_utc": at.to_rfc3339(),
                "date_unix": at.timestamp(),
                "rocket": { "id": "5e9d0d95eda69973a809d1ec", "name": "Falcon 9" },
                "launchpad": { "id": "5e9e4502f509094188566f88", "name": "KSC LC 39A" },
                "details": null,
                "links": { "webcast": format!("https://youtu.be/{id}") },
                "upcoming": true
            })
        })
        .collect();
    json!({ "docs": docs }).to_string()
}

/// LL2 `/launch/upcoming/` body with one launch per `(id, time, abbrev)`
pub fn ll2_page(launches: &[(&str, DateTime<Utc>, &str)]) -> String {
    let results: Vec<_> = launches
        .iter()
        .map(|(id, at, abbrev)| {
            json!({
                "id": id,
                "name": format!("Electron | {id}"),
                "net": at.to_rfc3339(),
                "status": { "name": "Go for Launch", "abbrev": abbrev },
                "rocket": { "configuration": { "name": "Electron" } },
                "pad": {
                    "name": "Rocket Lab LC-1A",
                    "latitude": "-39.26085",
                    "longitude": 177.864858,
                    "location": { "name": "Mahia Peninsula, New Zealand", "country_code": "NZL" }
                },
                "vidURLs": [],
                "mission": { "name": id, "description": "Rideshare" }
            })
        })
        .collect();
    json!({ "count": results.len(), "results": results }).to_string()
}
