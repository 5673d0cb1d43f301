// Presentation layer - JSON/SSE surface consumed by the dashboard front end
pub mod app_state;
pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use self::app_state::AppState;
use self::handlers::{
    clear_filters, connect, disconnect, events, get_filters, health_check, latest, navigate,
    put_filters, readings, status,
};

pub fn router(state: Arc<AppState>) -> Router {
    // The default compression predicate leaves event streams alone
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/status", get(status))
        .route("/api/latest", get(latest))
        .route("/api/readings", get(readings))
        .route(
            "/api/filters",
            get(get_filters).put(put_filters).delete(clear_filters),
        )
        .route("/api/page", post(navigate))
        .route("/api/connect", post(connect))
        .route("/api/disconnect", post(disconnect))
        .route("/api/events", get(events))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
