//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement (`REQUEST_TIMEOUT`, 30s default)
//! 4. Body size limit (64 KiB)
//! 5. Authentication (relay routes only, as an extractor)
//! 6. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server handles SIGTERM and CTRL+C gracefully: it stops accepting new
//! connections and lets in-flight requests finish.

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::{handlers, middleware::inject_request_id, AppState};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Creates the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use kryos_api::{create_router, AppState, Config};
///
/// fn build() -> anyhow::Result<axum::Router> {
///     let state = AppState::new(Config::load()?)?;
///     Ok(create_router(state))
/// }
/// ```
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    let health_routes = Router::new()
        .route("/", get(handlers::health_check))
        .route("/health", get(handlers::health_check));

    let relay_routes = Router::new()
        .route("/api/logs", post(handlers::relay_logs))
        .route("/api/brainrot", post(handlers::relay_brainrot));

    Router::new()
        .merge(health_routes)
        .merge(relay_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Starts the HTTP server with graceful shutdown support.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound or serving fails.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let scheme = state.gatekeeper.scheme();
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!(auth = %scheme, "Kryos relay listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
