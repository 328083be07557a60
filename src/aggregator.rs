//! Merges SpaceX and Launch Library 2 into one forward-looking launch list
//!
//! The pipeline for "all upcoming":
//! 1. Fetch both sources concurrently; each resolves to `[]` on total failure
//! 2. Normalize the first `per_source_cap` records of each
//! 3. Concatenate without de-duplication across sources
//! 4. Drop launches dated before the start of the current day
//! 5. Sort ascending by `date_unix`
//! 6. Recompute the live window, forcing `status = live` inside it

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::data::{Launch, LaunchStatus, Ll2Client, Ll2Launch, SpaceXClient, SpaceXLaunch};
use crate::normalize::{normalize_ll2, normalize_spacex};

/// Half-width of the live window around a launch's NET
pub const LIVE_WINDOW_SECS: i64 = 2 * 60 * 60;

/// Records taken from each source before merging
pub const DEFAULT_PER_SOURCE_CAP: usize = 10;

/// Page size requested from LL2
pub const DEFAULT_LL2_LIMIT: u32 = 20;

/// Sets `is_live` from the distance to `now` and escalates status when live
///
/// This is the only place a launch becomes `live`.
pub fn apply_live_window(launch: &mut Launch, now: DateTime<Utc>) {
    launch.is_live = launch.distance_from(now) <= Duration::seconds(LIVE_WINDOW_SECS);
    if launch.is_live {
        launch.status = LaunchStatus::Live;
    }
}

/// Steps 2-6 of the pipeline over already-fetched source records
pub fn merge_upcoming(
    spacex: &[SpaceXLaunch],
    ll2: &[Ll2Launch],
    per_source_cap: usize,
    now: DateTime<Utc>,
    today_start: DateTime<Utc>,
) -> Vec<Launch> {
    let cutoff = today_start.timestamp();

    let mut launches: Vec<Launch> = spacex
        .iter()
        .take(per_source_cap)
        .filter_map(normalize_spacex)
        .chain(ll2.iter().take(per_source_cap).filter_map(normalize_ll2))
        .filter(|launch| launch.date_unix() >= cutoff)
        .collect();

    launches.sort_by_key(Launch::date_unix);

    for launch in &mut launches {
        apply_live_window(launch, now);
    }

    launches
}

/// Fans out to the launch sources and merges their results
#[derive(Debug, Clone)]
pub struct Aggregator {
    spacex: SpaceXClient,
    ll2: Ll2Client,
    clock: Arc<dyn Clock>,
    per_source_cap: usize,
    ll2_limit: u32,
}

impl Aggregator {
    /// Creates an aggregator with the default caps
    pub fn new(spacex: SpaceXClient, ll2: Ll2Client, clock: Arc<dyn Clock>) -> Self {
        Self {
            spacex,
            ll2,
            clock,
            per_source_cap: DEFAULT_PER_SOURCE_CAP,
            ll2_limit: DEFAULT_LL2_LIMIT,
        }
    }

    /// Overrides how many records each source contributes
    pub fn with_per_source_cap(mut self, cap: usize) -> Self {
        self.per_source_cap = cap;
        self
    }

    /// Overrides the LL2 page size
    pub fn with_ll2_limit(mut self, limit: u32) -> Self {
        self.ll2_limit = limit;
        self
    }

    /// All launches from today onward, soonest first
    ///
    /// An empty list means "no data available right now", not "no launches":
    /// both sources failing with nothing cached also yields `[]`.
    pub async fn all_upcoming(&self) -> Vec<Launch> {
        let (spacex, ll2) = tokio::join!(
            self.spacex.fetch_upcoming(),
            self.ll2.fetch_upcoming(self.ll2_limit)
        );
        debug!(
            spacex = spacex.len(),
            ll2 = ll2.len(),
            "fetched upcoming launches"
        );

        merge_upcoming(
            &spacex,
            &ll2,
            self.per_source_cap,
            self.clock.now(),
            self.clock.start_of_today(),
        )
    }

    /// Launches currently inside the live window
    pub async fn live(&self) -> Vec<Launch> {
        self.all_upcoming()
            .await
            .into_iter()
            .filter(|launch| launch.is_live)
            .collect()
    }

    /// The soonest launch from today onward
    pub async fn next(&self) -> Option<Launch> {
        self.all_upcoming().await.into_iter().next()
    }
}
