//! `POST /api/brainrot`: brainrot notifications, routed by generation tier.

use axum::{extract::State, Json};
use kryos_core::{BrainrotPayload, Schema, Tier};
use kryos_delivery::embed::brainrot_message;
use tracing::{error, info, instrument, warn};

use super::{ApiError, SuccessResponse};
use crate::{middleware::AuthenticatedPayload, AppState};

/// Validates a brainrot notification, picks its tier and relays it to that
/// tier's destination.
///
/// # Errors
///
/// - `400` with the validation reason, including a generation below the floor
/// - `500` if the tier destination could not be reached
#[instrument(name = "relay_brainrot", skip_all, fields(request_id = %request.request_id))]
pub async fn relay_brainrot(
    State(state): State<AppState>,
    request: AuthenticatedPayload,
) -> Result<Json<SuccessResponse>, ApiError> {
    let brainrot = state
        .gatekeeper
        .validate(&request.payload, &Schema::BRAINROT)
        .map(|()| BrainrotPayload::from(&request.payload))
        .and_then(|brainrot| {
            let tier = Tier::from_generation_text(&brainrot.generation)?;
            Ok((brainrot, tier))
        });

    let (brainrot, tier) = match brainrot {
        Ok(admitted) => admitted,
        Err(failure) => {
            warn!(reason = failure.kind(), "Rejected brainrot payload: {}", failure);
            return Err(failure.into());
        },
    };

    let message = brainrot_message(&brainrot, tier, state.now());

    match state.delivery.deliver(state.config.destination_for(tier), &message).await {
        Ok(response) => {
            info!(
                tier = %tier,
                brainrot = %brainrot.brainrot_name,
                duration_ms = response.duration.as_millis(),
                "Brainrot notification relayed"
            );
            Ok(SuccessResponse::ok())
        },
        Err(source) => {
            error!(tier = %tier, error = %source, "Failed to deliver brainrot notification");
            Err(ApiError::Dispatch { message: "Failed to send notification", source })
        },
    }
}
