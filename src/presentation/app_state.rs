// Application state for HTTP handlers
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::application::dashboard_view::DashboardView;
use crate::application::session::Session;

pub struct AppState {
    pub session: Session,
    pub view: Mutex<DashboardView>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        let view = DashboardView::new(session.snapshot());
        Self {
            session,
            view: Mutex::new(view),
        }
    }

    /// Push the session's current snapshot into the view right away.
    pub async fn refresh_view(&self) {
        let snapshot = self.session.snapshot();
        self.view.lock().await.sync(snapshot);
    }
}

/// Keep the view in step with every snapshot the reconciler publishes.
pub fn spawn_view_sync(state: Arc<AppState>) -> JoinHandle<()> {
    let mut rx = state.session.subscribe();
    tokio::spawn(async move {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            state.view.lock().await.sync(snapshot);
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
