//! Maps source-native records onto [`Launch`]
//!
//! Every launch leaves here with `is_live == false`; escalation to `live`
//! happens only in the aggregator's live-window pass.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::data::ll2::Ll2Launch;
use crate::data::spacex::{Embedded, EmbeddedRef, SpaceXLaunch};
use crate::data::{Launch, LaunchLocation, LaunchStatus};

/// Vehicle name used when a source gives none
pub const UNKNOWN_ROCKET: &str = "Unknown Rocket";

/// Site name used when a source gives none
pub const UNKNOWN_SITE: &str = "Unknown Site";

/// LL2 status abbreviation meaning "confirmed go"
const LL2_GO_ABBREV: &str = "Go";

/// Display name of a field that may be a populated document or a bare id
///
/// A populated document yields its `name` (then `full_name`); a bare value is
/// used as-is. Anything missing or blank becomes `placeholder`.
pub fn resolve_name(field: Option<&Embedded<EmbeddedRef>>, placeholder: &str) -> String {
    let name = match field {
        Some(Embedded::Object(doc)) => doc
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(doc.full_name.as_deref()),
        Some(Embedded::Id(raw)) => Some(raw.as_str()),
        None => None,
    };
    non_blank(name).unwrap_or(placeholder).to_string()
}

/// Status of a SpaceX launch from its pending/outcome flags
pub fn spacex_status(launch: &SpaceXLaunch) -> LaunchStatus {
    if launch.upcoming {
        LaunchStatus::Upcoming
    } else {
        outcome_status(launch.success)
    }
}

/// Status of an LL2 launch from its status abbreviation
pub fn ll2_status(abbrev: Option<&str>) -> LaunchStatus {
    match abbrev {
        Some(LL2_GO_ABBREV) => LaunchStatus::Upcoming,
        _ => LaunchStatus::Tbd,
    }
}

/// Normalizes a SpaceX launch into a `spacex-<id>` record
///
/// Returns `None` if the record carries no usable date.
pub fn normalize_spacex(launch: &SpaceXLaunch) -> Option<Launch> {
    let mut normalized = spacex_base(launch, format!("spacex-{}", launch.id))?;
    normalized.status = spacex_status(launch);
    Some(normalized)
}

/// Normalizes a SpaceX past launch into a `past-<id>` record
///
/// Status is fixed by the outcome flag; a missing flag counts as failure.
pub fn normalize_spacex_past(launch: &SpaceXLaunch) -> Option<Launch> {
    let mut normalized = spacex_base(launch, format!("past-{}", launch.id))?;
    normalized.status = outcome_status(launch.success);
    Some(normalized)
}

/// Normalizes an LL2 launch into an `ll2-<id>` record
///
/// Returns `None` if `net` is not an RFC 3339 timestamp.
pub fn normalize_ll2(launch: &Ll2Launch) -> Option<Launch> {
    let Some(date) = parse_timestamp(&launch.net) else {
        debug!(id = %launch.id, net = %launch.net, "skipping LL2 launch with unparseable NET");
        return None;
    };

    let mut normalized = Launch::new(format!("ll2-{}", launch.id), launch.name.clone(), date);
    normalized.rocket = non_blank(
        launch
            .rocket
            .as_ref()
            .and_then(|r| r.configuration.as_ref())
            .and_then(|c| c.name.as_deref()),
    )
    .unwrap_or(UNKNOWN_ROCKET)
    .to_string();
    normalized.launch_site = non_blank(launch.pad.as_ref().and_then(|p| p.name.as_deref()))
        .unwrap_or(UNKNOWN_SITE)
        .to_string();
    normalized.status = ll2_status(launch.status.as_ref().and_then(|s| s.abbrev.as_deref()));
    normalized.livestream = launch
        .vid_urls
        .as_ref()
        .and_then(|videos| videos.first())
        .map(|video| video.url.clone());
    normalized.description = launch.mission.as_ref().and_then(|m| m.description.clone());
    normalized.location = ll2_location(launch);
    normalized.image = launch.image.clone();
    Some(normalized)
}

fn spacex_base(launch: &SpaceXLaunch, id: String) -> Option<Launch> {
    let date = launch
        .date_unix
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .or_else(|| launch.date_utc.as_deref().and_then(parse_timestamp));
    let Some(date) = date else {
        debug!(id = %launch.id, "skipping SpaceX launch without a date");
        return None;
    };

    let mut normalized = Launch::new(id, launch.name.clone(), date);
    normalized.rocket = resolve_name(launch.rocket.as_ref(), UNKNOWN_ROCKET);
    normalized.launch_site = resolve_name(launch.launchpad.as_ref(), UNKNOWN_SITE);
    normalized.livestream = launch.links.webcast.clone();
    normalized.description = launch.details.clone();
    normalized.image = launch
        .links
        .flickr
        .as_ref()
        .and_then(|f| f.original.first())
        .cloned();
    normalized.mission_patch = launch.links.patch.as_ref().and_then(|p| p.small.clone());
    Some(normalized)
}

fn ll2_location(launch: &Ll2Launch) -> Option<LaunchLocation> {
    let pad = launch.pad.as_ref()?;
    let lat = pad.latitude.as_ref()?.degrees()?;
    let lng = pad.longitude.as_ref()?.degrees()?;
    let name = non_blank(pad.location.as_ref().and_then(|l| l.name.as_deref()))
        .or(non_blank(pad.name.as_deref()))
        .unwrap_or(UNKNOWN_SITE)
        .to_string();

    Some(LaunchLocation {
        name,
        lat,
        lng,
        country_code: pad.location.as_ref().and_then(|l| l.country_code.clone()),
    })
}

fn outcome_status(success: Option<bool>) -> LaunchStatus {
    if success == Some(true) {
        LaunchStatus::Success
    } else {
        LaunchStatus::Failure
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
