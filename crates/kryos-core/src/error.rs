//! Validation failure taxonomy.
//!
//! Every rejection the Gatekeeper can produce after authentication succeeded.
//! The `Display` text is returned to the caller verbatim, so it must never
//! contain secret material.

use thiserror::Error;

/// Result of validating a payload: valid, or the first failure found.
pub type ValidationResult = std::result::Result<(), ValidationFailure>;

/// Reason a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// A required field is absent, null, false, zero or empty.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong type or shape.
    #[error("Invalid {0} format")]
    BadFormat(String),

    /// Timestamp is unparseable or outside the anti-replay window.
    #[error("Invalid or expired timestamp")]
    ExpiredTimestamp,

    /// Serialized payload contains a mass-mention pattern.
    #[error("Ping detected in payload")]
    PingDetected,

    /// Payload carries a key outside the schema.
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    /// Generation is not a number or below the notification floor.
    #[error("Generation too low or invalid")]
    GenerationTooLow,
}

impl ValidationFailure {
    /// Short machine-readable kind, used in log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::BadFormat(_) => "bad_format",
            Self::ExpiredTimestamp => "expired_timestamp",
            Self::PingDetected => "ping_detected",
            Self::UnexpectedField(_) => "unexpected_field",
            Self::GenerationTooLow => "generation_too_low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        assert_eq!(
            ValidationFailure::MissingField("userId".to_string()).to_string(),
            "Missing field: userId"
        );
        assert_eq!(
            ValidationFailure::BadFormat("placeId".to_string()).to_string(),
            "Invalid placeId format"
        );
        assert_eq!(
            ValidationFailure::UnexpectedField("extra".to_string()).to_string(),
            "Unexpected field: extra"
        );
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(ValidationFailure::ExpiredTimestamp.kind(), "expired_timestamp");
        assert_eq!(ValidationFailure::PingDetected.kind(), "ping_detected");
        assert_eq!(ValidationFailure::GenerationTooLow.kind(), "generation_too_low");
    }
}
