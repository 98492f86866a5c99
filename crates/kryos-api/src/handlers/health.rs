//! Liveness endpoint.

use axum::{extract::State, Json};
use kryos_core::AuthScheme;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::AppState;

/// Static service descriptor returned by `GET /` and `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"online"`.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Authenticity scheme in force.
    pub auth: AuthScheme,
}

/// Reports that the relay is up. Touches no external dependency.
#[instrument(name = "health_check", skip_all)]
pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
    debug!("Performing health check");

    Json(HealthResponse {
        status: "online",
        service: "Kryos Webhook Proxy",
        version: env!("CARGO_PKG_VERSION"),
        auth: app_state.gatekeeper.scheme(),
    })
}
