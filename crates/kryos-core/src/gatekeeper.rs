//! The Gatekeeper: authenticate, then validate.

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    auth::{authenticator_for, AuthScheme, Authenticator},
    error::{ValidationFailure, ValidationResult},
    models::{Payload, Schema},
    time::Clock,
    validation::PayloadValidator,
};

/// Why a request was turned away before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Missing or wrong authenticity proof. Deliberately carries no detail.
    #[error("authentication failed")]
    Unauthenticated,
    /// Authentic but malformed payload.
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),
}

/// Decides whether a request may trigger an outbound notification.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    authenticator: Arc<dyn Authenticator>,
    validator: PayloadValidator,
}

impl Gatekeeper {
    /// Pairs an authenticator with a validator.
    pub fn new(authenticator: Arc<dyn Authenticator>, validator: PayloadValidator) -> Self {
        Self { authenticator, validator }
    }

    /// Builds a gatekeeper for `scheme` using the scheme's defaults unless
    /// overridden.
    pub fn for_scheme(
        scheme: AuthScheme,
        secret: &str,
        clock: Arc<dyn Clock>,
        replay_window: Option<Duration>,
        reject_unexpected_fields: Option<bool>,
    ) -> Self {
        let validator = PayloadValidator::new(
            clock,
            replay_window.unwrap_or_else(|| scheme.default_replay_window()),
            reject_unexpected_fields.unwrap_or_else(|| scheme.rejects_unexpected_fields()),
        );

        Self::new(Arc::from(authenticator_for(scheme, secret)), validator)
    }

    /// Scheme in force.
    pub fn scheme(&self) -> AuthScheme {
        self.authenticator.scheme()
    }

    /// Validator in force.
    pub fn validator(&self) -> &PayloadValidator {
        &self.validator
    }

    /// Checks the authenticity proof.
    pub fn authenticate(&self, payload: &Payload, proof: Option<&str>) -> bool {
        self.authenticator.authenticate(payload, proof)
    }

    /// Checks the payload against `schema`.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationFailure` encountered.
    pub fn validate(&self, payload: &Payload, schema: &Schema) -> ValidationResult {
        self.validator.validate(payload, schema)
    }

    /// Authenticates, then validates. Validation never runs for an
    /// unauthenticated request.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::Unauthenticated` or `Rejection::Invalid`.
    pub fn admit(
        &self,
        payload: &Payload,
        proof: Option<&str>,
        schema: &Schema,
    ) -> Result<(), Rejection> {
        if !self.authenticate(payload, proof) {
            return Err(Rejection::Unauthenticated);
        }

        self.validate(payload, schema)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::{auth::SharedTokenAuthenticator, time::TestClock};

    const NOW: i64 = 1_700_000_000_000;

    fn object(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn gatekeeper(scheme: AuthScheme) -> Gatekeeper {
        Gatekeeper::for_scheme(
            scheme,
            "test_secret",
            Arc::new(TestClock::with_start_millis(NOW)),
            None,
            None,
        )
    }

    #[test]
    fn unauthenticated_requests_are_not_validated() {
        let gatekeeper = gatekeeper(AuthScheme::Token);

        assert_eq!(
            gatekeeper.admit(&Payload::new(), Some("wrong"), &Schema::BRAINROT),
            Err(Rejection::Unauthenticated)
        );
    }

    #[test]
    fn authenticated_requests_are_validated() {
        let gatekeeper = gatekeeper(AuthScheme::Token);
        let token = SharedTokenAuthenticator::token_for("test_secret");

        assert_eq!(
            gatekeeper.admit(&Payload::new(), Some(&token), &Schema::BRAINROT),
            Err(Rejection::Invalid(ValidationFailure::MissingField("brainrotName".to_string())))
        );
    }

    #[test]
    fn scheme_defaults_are_applied() {
        let signed = gatekeeper(AuthScheme::Signed);
        assert_eq!(signed.validator().replay_window(), Duration::from_secs(30));
        assert!(signed.validator().rejects_unexpected_fields());

        let token = gatekeeper(AuthScheme::Token);
        assert_eq!(token.validator().replay_window(), Duration::from_secs(60));
        assert!(!token.validator().rejects_unexpected_fields());
    }

    #[test]
    fn overrides_replace_scheme_defaults() {
        let gatekeeper = Gatekeeper::for_scheme(
            AuthScheme::Token,
            "test_secret",
            Arc::new(TestClock::with_start_millis(NOW)),
            Some(Duration::from_secs(5)),
            Some(true),
        );

        assert_eq!(gatekeeper.validator().replay_window(), Duration::from_secs(5));
        assert!(gatekeeper.validator().rejects_unexpected_fields());
    }

    #[test]
    fn signed_gatekeeper_admits_signed_payload() {
        let gatekeeper = gatekeeper(AuthScheme::Signed);
        let payload = object(json!({
            "timestamp": NOW,
            "jobId": "job",
            "placeId": "1",
            "generation": "300000",
            "brainrotName": "Tung"
        }));
        let signature =
            crate::auth::SignedPayloadAuthenticator::new("test_secret").sign(&payload).unwrap();

        assert_eq!(gatekeeper.scheme(), AuthScheme::Signed);
        assert_eq!(gatekeeper.admit(&payload, Some(&signature), &Schema::BRAINROT), Ok(()));
    }
}
