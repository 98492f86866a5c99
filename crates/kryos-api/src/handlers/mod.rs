//! HTTP request handlers for the Kryos API.
//!
//! Every relay handler follows the same path: an authenticated payload in,
//! schema validation, one outbound delivery, and a JSON verdict out. All
//! failures are rendered as `{"error": <reason>}` by [`ApiError`].

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kryos_core::{AuthScheme, ValidationFailure};
use kryos_delivery::DeliveryError;
use serde::Serialize;
use thiserror::Error;

pub mod brainrot;
pub mod health;
pub mod logs;

pub use brainrot::relay_brainrot;
pub use health::health_check;
pub use logs::relay_logs;

/// Body of a successful relay.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    pub(crate) fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Reason shown to the caller.
    pub error: String,
}

/// Every way a relay request can end without success.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not a JSON object.
    #[error("Invalid JSON body")]
    InvalidJson,

    /// Body could not be read, usually because it was too large.
    #[error(transparent)]
    Body(#[from] BytesRejection),

    /// Proof missing or wrong. The message depends only on the scheme.
    #[error("{}", .0.rejection_message())]
    Unauthenticated(AuthScheme),

    /// Authentic but malformed payload.
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),

    /// Outbound webhook call failed. The cause is logged, never returned.
    #[error("{message}")]
    Dispatch {
        /// Generic message for the caller.
        message: &'static str,
        /// Underlying delivery failure.
        #[source]
        source: DeliveryError,
    },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Body(rejection) => rejection.status(),
            Self::Unauthenticated(_) => StatusCode::FORBIDDEN,
            Self::Dispatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match &self {
            Self::Body(rejection) => rejection.body_text(),
            other => other.to_string(),
        };

        (self.status_code(), Json(ErrorResponse { error })).into_response()
    }
}
