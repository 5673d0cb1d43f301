// Session - owned connection state, replaces any process-wide client
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::feed_reconciler::{FeedReconciler, FeedSnapshot};
use crate::application::reading_source::ReadingSource;
use crate::domain::error::ConfigError;
use crate::infrastructure::config::FeedSettings;

struct RunningFeed {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct Session {
    source: Result<Arc<dyn ReadingSource>, ConfigError>,
    settings: FeedSettings,
    state: Arc<watch::Sender<FeedSnapshot>>,
    running: Mutex<Option<RunningFeed>>,
}

impl Session {
    pub fn new(source: Arc<dyn ReadingSource>, settings: FeedSettings) -> Self {
        Self::build(Ok(source), settings)
    }

    /// A session that can never connect; the snapshot carries the reason.
    pub fn unconfigured(error: ConfigError, settings: FeedSettings) -> Self {
        let session = Self::build(Err(error.clone()), settings);
        session.state.send_modify(|snapshot| snapshot.error = Some(error.to_string()));
        session
    }

    fn build(source: Result<Arc<dyn ReadingSource>, ConfigError>, settings: FeedSettings) -> Self {
        let (state, _) = watch::channel(FeedSnapshot::disconnected(settings.history_limit));
        Self {
            source,
            settings,
            state: Arc::new(state),
            running: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.borrow().clone()
    }

    /// Start the reconciler. A no-op while one is already running.
    pub fn connect(&self) -> Result<(), ConfigError> {
        let source = match &self.source {
            Ok(source) => Arc::clone(source),
            Err(err) => {
                self.state
                    .send_modify(|snapshot| snapshot.error = Some(err.to_string()));
                return Err(err.clone());
            }
        };

        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.as_ref().is_some_and(|feed| !feed.task.is_finished()) {
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let reconciler = FeedReconciler::new(
            source,
            self.settings.clone(),
            Arc::clone(&self.state),
            cancel.clone(),
        );
        let task = tokio::spawn(reconciler.run());
        *running = Some(RunningFeed { cancel, task });
        tracing::info!("Connecting to upstream");
        Ok(())
    }

    /// Release the subscription and clear the history. A fetch still in
    /// flight finishes on its own and its result is dropped.
    pub fn disconnect(&self) {
        if let Some(feed) = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            feed.cancel.cancel();
        }

        let capacity = self.settings.history_limit;
        self.state.send_modify(|snapshot| {
            let generation = snapshot.generation + 1;
            *snapshot = FeedSnapshot {
                generation,
                ..FeedSnapshot::disconnected(capacity)
            };
        });
        tracing::info!("Disconnected");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(feed) = self
            .running
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            feed.cancel.cancel();
        }
    }
}
