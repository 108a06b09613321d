//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use aviso_core::config::AvisoConfig;
use aviso_core::dates::Clock;
use aviso_core::error::Result;
use aviso_engine::Bootstrap;

use crate::connector::EnvConnector;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: AvisoConfig,
    pub clock: Clock,
    pub boot: Arc<Bootstrap>,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(super::routes::home))
        .route("/qr.png", get(super::routes::qr_png))
        .route("/status", get(super::routes::status))
        .route(
            "/send_pending",
            get(super::routes::send_pending).post(super::routes::send_pending),
        )
        .route("/preview", get(super::routes::preview))
        .route("/ping", get(super::routes::ping))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server. Bring-up stays lazy: the first poll on any route
/// (the platform health check in practice) arms it.
pub async fn start(config: AvisoConfig) -> Result<()> {
    let clock = Clock::from_name(&config.dispatch.timezone)?;
    let connector = Arc::new(EnvConnector::new(config.clone()));
    let boot = Arc::new(Bootstrap::new(connector, config.sheet.worksheet.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config,
        clock,
        boot,
        start_time: std::time::Instant::now(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Aviso gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
