//! `POST /api/logs`: execution logs.

use axum::{extract::State, Json};
use kryos_core::{LogsPayload, Schema};
use kryos_delivery::embed::logs_message;
use tracing::{error, info, instrument, warn};

use super::{ApiError, SuccessResponse};
use crate::{middleware::AuthenticatedPayload, AppState};

/// Validates an execution log and relays it to the logs destination.
///
/// # Errors
///
/// - `400` with the validation reason
/// - `500` if the logs destination could not be reached
#[instrument(name = "relay_logs", skip_all, fields(request_id = %request.request_id))]
pub async fn relay_logs(
    State(state): State<AppState>,
    request: AuthenticatedPayload,
) -> Result<Json<SuccessResponse>, ApiError> {
    if let Err(failure) = state.gatekeeper.validate(&request.payload, &Schema::LOGS) {
        warn!(reason = failure.kind(), "Rejected logs payload: {}", failure);
        return Err(failure.into());
    }

    let logs = LogsPayload::from(&request.payload);
    let message = logs_message(&logs, state.now());

    match state.delivery.deliver(state.config.logs_destination(), &message).await {
        Ok(response) => {
            info!(
                user_id = %logs.user_id,
                place_id = %logs.place_id,
                duration_ms = response.duration.as_millis(),
                "Logs relayed"
            );
            Ok(SuccessResponse::ok())
        },
        Err(source) => {
            error!(error = %source, "Failed to deliver logs");
            Err(ApiError::Dispatch { message: "Failed to send logs", source })
        },
    }
}
