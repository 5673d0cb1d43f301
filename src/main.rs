// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use sensor_dashboard::application::session::Session;
use sensor_dashboard::infrastructure::config::load_app_config;
use sensor_dashboard::infrastructure::supabase_repository::SupabaseRepository;
use sensor_dashboard::presentation::app_state::{spawn_view_sync, AppState};
use sensor_dashboard::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Missing connection parameters keep the session disconnected
    let session = match app_config.source.credentials() {
        Ok(credentials) => {
            let repository = Arc::new(SupabaseRepository::new(credentials, &app_config.feed));
            Session::new(repository, app_config.feed.clone())
        }
        Err(err) => {
            tracing::error!("{}", err);
            Session::unconfigured(err, app_config.feed.clone())
        }
    };

    if session.connect().is_err() {
        tracing::warn!("Starting without a live feed");
    }

    let state = Arc::new(AppState::new(session));
    spawn_view_sync(state.clone());

    let router = router(state);

    let addr: SocketAddr = app_config.server.bind.parse()?;
    tracing::info!("Starting sensor-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
