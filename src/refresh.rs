//! Background launch polling
//!
//! Re-runs a launch query on a fixed cadence through the shared
//! [`LaunchService`] and forwards each result over a tokio channel. Polling
//! faster than the cache TTLs costs nothing upstream: repeated calls are
//! answered by the response cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::cache::QueryKind;
use crate::service::{LaunchService, LaunchesResponse, NextLaunchResponse};

/// Messages sent from the background poller
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// Fresh result of the `all` or `live` query
    LaunchesUpdated {
        kind: QueryKind,
        response: LaunchesResponse,
    },
    /// Fresh result of the `next` query
    NextUpdated(NextLaunchResponse),
}

/// Configuration for refresh intervals
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval for the `all` and `next` queries
    pub all_interval: Duration,
    /// Interval for the `live` query
    pub live_interval: Duration,
    /// Whether polling is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            all_interval: Duration::from_secs(120),
            live_interval: Duration::from_secs(30),
            enabled: true,
        }
    }
}

impl RefreshConfig {
    /// Polling cadence for `kind`
    pub fn interval_for(&self, kind: QueryKind) -> Duration {
        match kind {
            QueryKind::Live => self.live_interval,
            QueryKind::All | QueryKind::Next => self.all_interval,
        }
    }
}

/// Handle for controlling the background poller
pub struct RefreshHandle {
    /// Channel for receiving refreshed results
    pub receiver: mpsc::Receiver<RefreshMessage>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns a task polling `kind` on its configured cadence
    ///
    /// The first poll happens one interval after spawning; callers already
    /// hold the initial result.
    pub fn spawn(service: Arc<LaunchService>, kind: QueryKind, config: RefreshConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            let period = config.interval_for(kind);

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            debug!(query = %kind, "polling");
                            let message = poll(&service, kind).await;
                            if msg_tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Stops the background task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn poll(service: &LaunchService, kind: QueryKind) -> RefreshMessage {
    match kind {
        QueryKind::All => RefreshMessage::LaunchesUpdated {
            kind,
            response: service.all_upcoming().await,
        },
        QueryKind::Live => RefreshMessage::LaunchesUpdated {
            kind,
            response: service.live().await,
        },
        QueryKind::Next => RefreshMessage::NextUpdated(service.next().await),
    }
}

/// Checks for a pending refresh message without blocking
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
