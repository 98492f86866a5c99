//! Authenticity check at the edge of every relay route.
//!
//! Reads the body, parses it as a JSON object and checks the proof header of
//! the configured scheme. Handlers only ever see authenticated payloads.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::HeaderMap,
};
use kryos_core::{AuthScheme, Payload};
use kryos_delivery::embed::security_alert_message;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{handlers::ApiError, middleware::RequestId, AppState};

/// Security alerts allowed in flight at once. Failures beyond this are
/// logged but not forwarded.
pub const MAX_PENDING_SECURITY_ALERTS: usize = 4;

/// A JSON object body whose proof header matched.
#[derive(Debug, Clone)]
pub struct AuthenticatedPayload {
    /// Parsed body, keys in the order they were sent.
    pub payload: Payload,
    /// ID of the carrying request.
    pub request_id: String,
}

impl FromRequest<AppState> for AuthenticatedPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let scheme = state.gatekeeper.scheme();
        let route = req.uri().path().to_string();
        let request_id =
            req.extensions().get::<RequestId>().map(|id| id.0.clone()).unwrap_or_default();
        let proof = extract_proof(req.headers(), scheme);

        let body = Bytes::from_request(req, state).await?;
        let payload = parse_payload(&body)?;

        if !state.gatekeeper.authenticate(&payload, proof.as_deref()) {
            warn!(
                route = %route,
                scheme = %scheme,
                proof_present = proof.is_some(),
                request_id = %request_id,
                "Authentication failed"
            );
            spawn_security_alert(state, &route, &request_id);
            return Err(ApiError::Unauthenticated(scheme));
        }

        Ok(Self { payload, request_id })
    }
}

/// Extracts the proof header for `scheme`. Non-ASCII values count as absent.
fn extract_proof(headers: &HeaderMap, scheme: AuthScheme) -> Option<String> {
    headers.get(scheme.header_name()).and_then(|v| v.to_str().ok()).map(String::from)
}

/// Parses a body that must be a JSON object.
fn parse_payload(body: &[u8]) -> Result<Payload, ApiError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(payload)) => Ok(payload),
        Ok(_) | Err(_) => Err(ApiError::InvalidJson),
    }
}

/// Fire-and-forget alert for a rejected request. No-op when no security
/// destination is configured or every alert permit is taken.
fn spawn_security_alert(state: &AppState, route: &str, request_id: &str) {
    let Some(url) = state.config.security_destination() else {
        return;
    };

    let Ok(permit) = state.alert_permits.clone().try_acquire_owned() else {
        debug!(
            route = %route,
            request_id = %request_id,
            "Security alert dropped, too many in flight"
        );
        return;
    };

    let url = url.to_string();
    let message = security_alert_message(route, state.gatekeeper.scheme(), request_id, state.now());
    let delivery = state.delivery.clone();

    tokio::spawn(async move {
        let _permit = permit;
        match delivery.deliver(&url, &message).await {
            Ok(_) => debug!("Security alert delivered"),
            Err(e) => warn!(error = %e, "Security alert delivery failed"),
        }
    });
}
