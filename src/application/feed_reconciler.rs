// Feed reconciler - keeps the history in step with upstream change notifications
use chrono::{DateTime, Utc};
use futures::{FutureExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::history_store::HistoryStore;
use crate::application::reading_source::{ChangeStream, ReadingSource};
use crate::domain::error::SourceError;
use crate::domain::reading::Reading;
use crate::infrastructure::config::FeedSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What the reconciler publishes after every state change.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub connection: ConnectionState,
    pub history: HistoryStore,
    pub error: Option<String>,
    pub warning: Option<String>,
    /// History is the last good one after a failed refresh.
    pub stale: bool,
    /// Bumped whenever `history` changes.
    pub generation: u64,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn disconnected(capacity: usize) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            history: HistoryStore::with_capacity(capacity),
            error: None,
            warning: None,
            stale: false,
            generation: 0,
            last_refreshed: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }
}

const FEED_CLOSED_WARNING: &str = "Live updates stopped; showing last received data";

/// Problems with the live feed that outlast a single publish.
#[derive(Debug, Default)]
struct FeedHealth {
    closed: bool,
    refresh_error: Option<SourceError>,
}

impl FeedHealth {
    fn warning(&self) -> Option<String> {
        let refresh = self
            .refresh_error
            .as_ref()
            .map(|err| format!("Refresh failed: {}", err));
        let closed = self.closed.then(|| FEED_CLOSED_WARNING.to_string());
        match (refresh, closed) {
            (Some(refresh), Some(closed)) => Some(format!("{}; {}", refresh, closed)),
            (refresh, closed) => refresh.or(closed),
        }
    }
}

pub struct FeedReconciler {
    source: Arc<dyn ReadingSource>,
    settings: FeedSettings,
    state: Arc<watch::Sender<FeedSnapshot>>,
    cancel: CancellationToken,
}

impl FeedReconciler {
    pub fn new(
        source: Arc<dyn ReadingSource>,
        settings: FeedSettings,
        state: Arc<watch::Sender<FeedSnapshot>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            settings,
            state,
            cancel,
        }
    }

    /// Initial fetch, subscribe, then reconcile until cancelled.
    pub async fn run(self) {
        self.publish(|snapshot| {
            snapshot.connection = ConnectionState::Connecting;
            snapshot.error = None;
            snapshot.warning = None;
        });

        let readings = match self.fetch().await {
            Ok(readings) => readings,
            Err(err) => {
                tracing::error!("Initial fetch failed: {}", err);
                self.fail_connect(&err);
                return;
            }
        };

        if self.cancel.is_cancelled() {
            tracing::debug!("Discarding initial fetch, session was disconnected");
            return;
        }

        let changes = match self.source.subscribe().await {
            Ok(changes) => changes,
            Err(err) => {
                tracing::error!("Subscribing to changes failed: {}", err);
                self.fail_connect(&err);
                return;
            }
        };

        let count = readings.len();
        if !self.apply(readings, &FeedHealth::default()) {
            return;
        }
        tracing::info!("Connected, {} readings loaded", count);

        self.reconcile(changes).await;
        tracing::debug!("Reconciler stopped, subscription released");
    }

    async fn reconcile(&self, changes: ChangeStream) {
        let mut changes = changes.fuse();
        let mut health = FeedHealth::default();
        let mut retry_at: Option<Instant> = None;

        loop {
            let mut retrying = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                event = changes.next(), if !health.closed => match event {
                    Some(event) => {
                        tracing::debug!("Change notification: {:?}", event.kind);
                        false
                    }
                    None => {
                        self.close_feed(&mut health);
                        continue;
                    }
                },
                _ = wait_until(retry_at) => {
                    tracing::debug!("Retrying failed refresh");
                    true
                }
            };

            // Single flight: notifications arriving mid-fetch collapse into one
            // trailing refetch.
            loop {
                if !drain(&mut changes) {
                    self.close_feed(&mut health);
                }

                let mut dirty = false;
                let fetch = self.fetch();
                tokio::pin!(fetch);
                let result = loop {
                    tokio::select! {
                        result = &mut fetch => break result,
                        event = changes.next(), if !health.closed => match event {
                            Some(_) => dirty = true,
                            None => self.close_feed(&mut health),
                        },
                    }
                };

                if self.cancel.is_cancelled() {
                    tracing::debug!("Discarding refresh result, session was disconnected");
                    return;
                }

                match result {
                    Ok(readings) => {
                        tracing::debug!("Refreshed history with {} readings", readings.len());
                        health.refresh_error = None;
                        self.apply(readings, &health);
                        retry_at = None;
                    }
                    Err(err) => {
                        tracing::warn!("Refresh failed, keeping last good history: {}", err);
                        health.refresh_error = Some(err);
                        self.publish(|snapshot| {
                            snapshot.stale = true;
                            snapshot.warning = health.warning();
                        });
                        // One retry per failure; a failed retry waits for the next notification
                        retry_at = (!retrying)
                            .then(|| Instant::now() + self.settings.retry_delay());
                    }
                }

                if !dirty {
                    break;
                }
                retrying = false;
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Reading>, SourceError> {
        let timeout = self.settings.fetch_timeout();
        match tokio::time::timeout(timeout, self.source.fetch_latest(self.settings.history_limit))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(timeout)),
        }
    }

    fn apply(&self, readings: Vec<Reading>, health: &FeedHealth) -> bool {
        self.publish(|snapshot| {
            snapshot.history.replace_all(readings);
            snapshot.connection = ConnectionState::Connected;
            snapshot.error = None;
            snapshot.warning = health.warning();
            snapshot.stale = false;
            snapshot.generation += 1;
            snapshot.last_refreshed = Some(Utc::now());
        })
    }

    fn close_feed(&self, health: &mut FeedHealth) {
        if health.closed {
            return;
        }
        health.closed = true;
        tracing::warn!("Upstream change feed closed");
        self.publish(|snapshot| snapshot.warning = health.warning());
    }

    fn fail_connect(&self, err: &SourceError) {
        self.publish(|snapshot| {
            snapshot.connection = ConnectionState::Disconnected;
            snapshot.history.clear();
            snapshot.error = Some(format!("Error: {}", err));
            snapshot.warning = None;
            snapshot.stale = false;
            snapshot.generation += 1;
        });
    }

    /// Runs under the watch lock, so a disconnect that already happened wins.
    fn publish(&self, update: impl FnOnce(&mut FeedSnapshot)) -> bool {
        let cancel = &self.cancel;
        self.state.send_if_modified(|snapshot| {
            if cancel.is_cancelled() {
                return false;
            }
            update(snapshot);
            true
        })
    }
}

/// Consume notifications that are already queued. Returns false once the
/// stream has ended.
fn drain(changes: &mut futures::stream::Fuse<ChangeStream>) -> bool {
    loop {
        match changes.next().now_or_never() {
            Some(Some(_)) => continue,
            Some(None) => return false,
            None => return true,
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
