//! End-to-end behavior of the launch queries against scripted upstreams

mod common;

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use launchwatch::aggregator::LIVE_WINDOW_SECS;
use launchwatch::cache::SourceCache;
use launchwatch::clock::{Clock, ManualClock};
use launchwatch::data::{FactKind, Ll2Client};
use launchwatch::normalize::UNKNOWN_ROCKET;
use launchwatch::service::ResponseSource;
use launchwatch::LaunchStatus;

use common::*;

#[tokio::test]
async fn test_all_upcoming_sorted_from_today_with_consistent_live_flags() {
    let (service, transport, clock) = setup();
    let now = clock.now();
    transport.reply(
        SPACEX_LAUNCHES,
        200,
        spacex_page(&[
            ("s-later", now + Duration::days(3)),
            ("s-soon", now + Duration::hours(1)),
        ]),
    );
    transport.reply(
        LL2_UPCOMING,
        200,
        ll2_page(&[
            ("l-mid", now + Duration::days(2), "Go"),
            ("l-overdue", now - Duration::days(1), "Go"),
            ("l-dawn", now - Duration::hours(9), "TBD"),
        ]),
    );

    let launches = service.get_all_upcoming_launches().await;

    let today_start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap().timestamp();
    let ids: Vec<&str> = launches.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["ll2-l-dawn", "spacex-s-soon", "ll2-l-mid", "spacex-s-later"]);
    assert!(launches.windows(2).all(|w| w[0].date_unix() <= w[1].date_unix()));
    assert!(launches.iter().all(|l| l.date_unix() >= today_start));
    for launch in &launches {
        assert_eq!(launch.is_live, launch.status == LaunchStatus::Live);
        if launch.is_live {
            assert!((launch.date_unix() - now.timestamp()).abs() <= LIVE_WINDOW_SECS);
        }
    }
    assert!(launches[1].is_live);
    assert!(!launches[0].is_live);
}

#[tokio::test]
async fn test_spacex_launch_in_thirty_minutes_is_live() {
    let (service, transport, clock) = setup();
    let now = clock.now();
    transport.reply(SPACEX_LAUNCHES, 200, spacex_page(&[("s1", now + Duration::minutes(30))]));
    transport.reply(LL2_UPCOMING, 200, ll2_page(&[]));

    let launches = service.get_all_upcoming_launches().await;

    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].status, LaunchStatus::Live);
    assert!(launches[0].is_live);

    let live = service.get_live_launches().await;
    assert_eq!(live, launches);
}

#[tokio::test]
async fn test_overdue_ll2_launch_excluded() {
    let (service, transport, clock) = setup();
    let now = clock.now();
    transport.reply(SPACEX_LAUNCHES, 200, spacex_page(&[]));
    transport.reply(LL2_UPCOMING, 200, ll2_page(&[("late", now - Duration::days(1), "Go")]));

    assert!(service.get_all_upcoming_launches().await.is_empty());
    assert!(service.get_next_launch().await.is_none());
}

#[tokio::test]
async fn test_repeat_call_is_identical_and_free() {
    let (service, transport, clock) = setup();
    let now = clock.now();
    transport.reply(SPACEX_LAUNCHES, 200, spacex_page(&[("s1", now + Duration::days(1))]));
    transport.reply(LL2_UPCOMING, 200, ll2_page(&[("l1", now + Duration::days(2), "Go")]));

    let first = service.all_upcoming().await;
    let calls_after_first = transport.total_calls();
    clock.advance(Duration::minutes(10));
    let second = service.all_upcoming().await;

    assert_eq!(
        serde_json::to_string(&first.launches).unwrap(),
        serde_json::to_string(&second.launches).unwrap()
    );
    assert_eq!(transport.total_calls(), calls_after_first);
    assert_eq!(second.source, ResponseSource::ServerCache);
}

#[tokio::test]
async fn test_ll2_rate_limit_serves_last_good_page() {
    let transport = ScriptedTransport::new();
    let clock = Arc::new(ManualClock::new(start()));
    let client = Ll2Client::with_base_url(
        transport.clone(),
        SourceCache::new(clock.clone()),
        "http://ll2.test/2.2.0",
    );
    let now = start();
    transport.reply(
        LL2_UPCOMING,
        200,
        ll2_page(&[
            ("a", now + Duration::days(1), "Go"),
            ("b", now + Duration::days(2), "Go"),
            ("c", now + Duration::days(3), "TBD"),
        ]),
    );

    let fresh = client.fetch_upcoming(20).await;
    clock.advance(Duration::minutes(45));
    transport.reply(LL2_UPCOMING, 429, r#"{"detail": "Request was throttled."}"#);
    let throttled = client.fetch_upcoming(20).await;

    assert_eq!(fresh.len(), 3);
    assert_eq!(throttled, fresh);
    assert_eq!(transport.calls(LL2_UPCOMING), 2);
}

#[tokio::test]
async fn test_rate_limited_aggregate_keeps_stale_records() {
    let (service, transport, clock) = setup();
    let now = clock.now();
    transport.reply(SPACEX_LAUNCHES, 200, spacex_page(&[]));
    transport.reply(
        LL2_UPCOMING,
        200,
        ll2_page(&[
            ("a", now + Duration::days(1), "Go"),
            ("b", now + Duration::days(2), "Go"),
            ("c", now + Duration::days(3), "Go"),
        ]),
    );

    let before = service.get_all_upcoming_launches().await;
    clock.advance(Duration::minutes(31));
    transport.reply(LL2_UPCOMING, 429, "");
    transport.go_down(SPACEX_LAUNCHES);
    let after = service.all_upcoming().await;

    assert!(!after.cached);
    assert_eq!(after.launches.len(), 3);
    assert_eq!(after.launches, before);
}

#[tokio::test]
async fn test_no_upstreams_gives_empty_answers() {
    let (service, transport, _clock) = setup();
    transport.go_down(SPACEX_LAUNCHES);
    transport.go_down(LL2_UPCOMING);
    transport.go_down(SPACEX_ROCKETS);
    transport.go_down(NASA_APOD);

    assert!(service.get_all_upcoming_launches().await.is_empty());
    assert!(service.get_live_launches().await.is_empty());
    assert!(service.get_next_launch().await.is_none());

    let facts = service.get_rocket_facts().await;
    assert_eq!(facts.len(), 3);
    assert!(facts.iter().all(|f| f.kind == FactKind::Trivia));
}

#[tokio::test]
async fn test_rocket_name_forms() {
    let (service, transport, clock) = setup();
    let at = (clock.now() + Duration::days(1)).timestamp();
    let body = json!({ "docs": [
        { "id": "obj", "name": "A", "date_unix": at, "rocket": { "name": "Falcon Heavy" } },
        { "id": "str", "name": "B", "date_unix": at + 1, "rocket": "5e9d0d95eda69973a809d1ec" },
        { "id": "none", "name": "C", "date_unix": at + 2 }
    ] });
    transport.reply(SPACEX_LAUNCHES, 200, body.to_string());
    transport.reply(LL2_UPCOMING, 200, ll2_page(&[]));

    let launches = service.get_all_upcoming_launches().await;

    let rockets: Vec<&str> = launches.iter().map(|l| l.rocket.as_str()).collect();
    assert_eq!(rockets, vec!["Falcon Heavy", "5e9d0d95eda69973a809d1ec", UNKNOWN_ROCKET]);
}

#[tokio::test]
async fn test_concurrent_callers_see_one_result() {
    let (service, transport, clock) = setup();
    let now = clock.now();
    transport.reply(SPACEX_LAUNCHES, 200, spacex_page(&[("s1", now + Duration::days(1))]));
    transport.reply(LL2_UPCOMING, 200, ll2_page(&[("l1", now + Duration::days(1), "Go")]));
    let service = Arc::new(service);

    let results =
        futures::future::join_all((0..8).map(|_| service.get_all_upcoming_launches())).await;

    assert!(results.iter().all(|r| r == &results[0]));
    assert_eq!(results[0].len(), 2);
    assert!(transport.calls(SPACEX_LAUNCHES) >= 1);
}

#[tokio::test]
async fn test_facts_combine_rockets_apod_and_trivia() {
    let (service, transport, _clock) = setup();
    transport.reply(
        SPACEX_ROCKETS,
        200,
        json!([{
            "id": "5e9d0d95eda69973a809d1ec",
            "name": "Falcon 9",
            "type": "rocket",
            "active": true,
            "success_rate_pct": 98,
            "height": { "meters": 70, "feet": 229.6 },
            "mass": { "kg": 549054, "lb": 1207920 },
            "description": "Falcon 9 is a two-stage rocket."
        }])
        .to_string(),
    );
    transport.reply(
        NASA_APOD,
        200,
        json!({
            "date": "2025-06-01",
            "title": "A Galaxy Far Away",
            "explanation": "Light from long ago.",
            "media_type": "image"
        })
        .to_string(),
    );

    let facts = service.get_rocket_facts().await;

    let ids: Vec<&str> = facts.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "rocket-height-0",
            "rocket-mass-0",
            "rocket-success-0",
            "rocket-desc-0",
            "apod",
            "trivia-1",
            "trivia-2",
            "trivia-3"
        ]
    );
    assert_eq!(facts[0].value, "70m (229.6ft)");
    assert_eq!(facts[1].value, "549,054kg");
    assert_eq!(facts[4].title, "A Galaxy Far Away");
}

#[tokio::test]
async fn test_malformed_ll2_record_keeps_rest_of_page() {
    let (service, transport, clock) = setup();
    let good = (clock.now() + Duration::days(1)).to_rfc3339();
    transport.reply(SPACEX_LAUNCHES, 200, spacex_page(&[]));
    transport.reply(
        LL2_UPCOMING,
        200,
        json!({ "results": [
            { "id": "good", "name": "Electron | Good", "net": good, "status": { "abbrev": "Go" } },
            { "id": "pending", "name": "Electron | Pending", "net": null }
        ] })
        .to_string(),
    );

    let launches = service.get_all_upcoming_launches().await;

    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].id, "ll2-good");
    assert_eq!(launches[0].status, LaunchStatus::Upcoming);
}

#[tokio::test]
async fn test_next_recovers_after_cold_start_outage() {
    let (service, transport, clock) = setup();
    transport.go_down(SPACEX_LAUNCHES);
    transport.go_down(LL2_UPCOMING);

    let during_outage = service.next().await;
    transport.reply(SPACEX_LAUNCHES, 200, spacex_page(&[("s1", clock.now() + Duration::days(1))]));
    transport.reply(LL2_UPCOMING, 200, ll2_page(&[]));
    clock.advance(Duration::minutes(1));
    let recovered = service.next().await;

    assert!(during_outage.launch.is_none());
    assert!(!recovered.cached);
    assert_eq!(recovered.source, ResponseSource::Api);
    assert_eq!(recovered.launch.map(|l| l.id), Some("spacex-s1".to_string()));
    assert_eq!(transport.calls(SPACEX_LAUNCHES), 2);
}
