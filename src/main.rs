// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::board_service::BoardService;
use crate::application::driver_detail::DriverDetailService;
use crate::application::location_source::LocationSource;
use crate::domain::location::DriverLocationFix;
use crate::domain::viewport::ViewportController;
use crate::infrastructure::cache::{CachedLocationSource, MemoryCache};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_location_source::HttpLocationSource;
use crate::infrastructure::session::Session;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    board_events, clear_selection, clear_session_token, driver_location, get_board,
    health_check, refresh_board, select_driver, set_session_token,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fleet_locations=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_app_config()?;

    // Session and location source (infrastructure layer)
    let session = Arc::new(Session::new(config.api.token.clone()));
    let http_source = HttpLocationSource::new(
        config.api.base_url.clone(),
        session.clone(),
        config.api.timeout(),
    )?;
    let source: Arc<dyn LocationSource> = match config.board.cache_ttl() {
        Some(ttl) => {
            tracing::info!("Caching driver locations for {:?}", ttl);
            Arc::new(CachedLocationSource::new(
                Arc::new(http_source),
                Arc::new(MemoryCache::<Vec<DriverLocationFix>>::new()),
                ttl,
            ))
        }
        None => Arc::new(http_source),
    };

    // Create services (application layer)
    let controller = ViewportController::new(config.map);
    let board_service = BoardService::new(source.clone(), controller);
    let detail_service = DriverDetailService::new(source, controller);

    board_service.mount().await;
    let auto_refresh = config
        .board
        .auto_refresh()
        .map(|period| board_service.spawn_auto_refresh(period));

    // Create application state
    let state = Arc::new(AppState {
        board_service: board_service.clone(),
        detail_service,
        session,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/board", get(get_board))
        .route("/board/refresh", post(refresh_board))
        .route("/board/selection", delete(clear_selection))
        .route("/board/selection/:driver_id", put(select_driver))
        .route("/board/events", get(board_events))
        .route("/drivers/:driver_id/location", get(driver_location))
        .route(
            "/session/token",
            put(set_session_token).delete(clear_session_token),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting fleet-locations service on {}", addr);

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        if let Some(task) = auto_refresh {
            task.abort();
        }
        // Ends open event streams so the server can drain
        board_service.unmount().await;
    };

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Shut down");

    Ok(())
}
