//! Shared response cache keyed by query type

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::data::Launch;

/// Default lifetime of a cached query result
pub const RESPONSE_TTL_MINUTES: i64 = 30;

/// The aggregate queries served through the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    All,
    Live,
    Next,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::All => "all",
            QueryKind::Live => "live",
            QueryKind::Next => "next",
        };
        f.write_str(name)
    }
}

/// A cached aggregate result
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResult {
    /// Result of the `all` or `live` query
    Launches(Vec<Launch>),
    /// Result of the `next` query; "no launch" is never cached
    Next(Launch),
}

/// Process-wide cache in front of the aggregator
///
/// Only expiry invalidates an entry, so results can lag the per-source caches
/// by up to one TTL. Two callers that miss at the same time both fan out and
/// the last write wins.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<QueryKind, (CachedResult, DateTime<Utc>)>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Creates a cache with the default 30 minute TTL
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::minutes(RESPONSE_TTL_MINUTES))
    }

    /// Creates a cache with a custom TTL
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            clock,
        }
    }

    /// The cached result for `kind` while it is younger than the TTL
    pub fn get(&self, kind: QueryKind) -> Option<CachedResult> {
        let entry = self.entries.get(&kind)?;
        let (result, stored_at) = entry.value();
        (self.clock.now() - *stored_at < self.ttl).then(|| result.clone())
    }

    /// Stores `result` for `kind`, replacing any previous entry
    pub fn set(&self, kind: QueryKind, result: CachedResult) {
        self.entries.insert(kind, (result, self.clock.now()));
    }
}
