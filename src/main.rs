//! LaunchWatch - Upcoming rocket launches as JSON
//!
//! Prints the result of one query to stdout. With `--watch` the query is
//! re-polled and every result printed as a new line until Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use launchwatch::cache::QueryKind;
use launchwatch::cli::{Cli, Query, StartupConfig};
use launchwatch::config::Config;
use launchwatch::refresh::{RefreshConfig, RefreshHandle, RefreshMessage};
use launchwatch::service::{LaunchService, LaunchesResponse};

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("launchwatch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), serde_json::Error> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn truncate(mut response: LaunchesResponse, limit: Option<usize>) -> LaunchesResponse {
    if let Some(limit) = limit {
        response.launches.truncate(limit);
    }
    response
}

async fn run_query(service: &LaunchService, startup: &StartupConfig) -> serde_json::Result<()> {
    let pretty = startup.pretty;
    match startup.query {
        Query::All => print_json(&truncate(service.all_upcoming().await, startup.limit), pretty),
        Query::Live => print_json(&truncate(service.live().await, startup.limit), pretty),
        Query::Next => print_json(&service.next().await, pretty),
        Query::Facts => {
            let mut facts = service.get_rocket_facts().await;
            if let Some(limit) = startup.limit {
                facts.truncate(limit);
            }
            print_json(&json!({ "facts": facts }), pretty)
        }
        Query::Past => {
            let launches = service.get_past_launches(startup.past_limit()).await;
            print_json(&json!({ "launches": launches }), pretty)
        }
    }
}

async fn watch(
    service: Arc<LaunchService>,
    kind: QueryKind,
    startup: &StartupConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = RefreshConfig::default();
    info!(query = %kind, interval = ?config.interval_for(kind), "watching");
    let mut handle = RefreshHandle::spawn(service, kind, config);

    loop {
        tokio::select! {
            message = handle.receiver.recv() => {
                match message {
                    Some(RefreshMessage::LaunchesUpdated { response, .. }) => {
                        print_json(&truncate(response, startup.limit), startup.pretty)?;
                    }
                    Some(RefreshMessage::NextUpdated(response)) => {
                        print_json(&response, startup.pretty)?;
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let startup = StartupConfig::from_cli(&cli)?;

    init_tracing();

    let mut config = Config::from_env()?;
    startup.apply(&mut config);

    let service = Arc::new(LaunchService::from_config(&config)?);
    run_query(&service, &startup).await?;

    if startup.watch {
        match startup.query.cache_kind() {
            Some(kind) => watch(service, kind, &startup).await?,
            None => warn!("--watch only applies to all, live and next"),
        }
    }

    Ok(())
}
