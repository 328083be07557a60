//! In-memory caches shielding the upstream APIs
//!
//! `SourceCache` sits under each source client and keeps the last good payload
//! per key so a failed or rate-limited fetch can fall back to stale data.
//! `ResponseCache` sits in front of the aggregator and collapses repeated
//! queries into one upstream fan-out per TTL window.

mod manager;
mod response;

pub use manager::{CachedData, SourceCache};
pub use response::{CachedResult, QueryKind, ResponseCache, RESPONSE_TTL_MINUTES};
