//! Authenticity strategies.
//!
//! A deployment runs exactly one scheme. Both prove knowledge of the shared
//! secret without sending it; only the signed scheme also binds the proof to
//! the request body.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    crypto::{canonical_json, constant_time_eq, hmac_sha256_hex, sha256_hex, CryptoError},
    models::Payload,
};

/// Which authenticity proof the deployment expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// HMAC-SHA256 over the sorted-key body, in `x-signature`.
    #[serde(alias = "hmac")]
    Signed,
    /// Hex SHA-256 of the shared secret, in `x-auth-token`.
    Token,
}

impl AuthScheme {
    /// Request header carrying the proof.
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::Signed => "x-signature",
            Self::Token => "x-auth-token",
        }
    }

    /// Default anti-replay window.
    pub const fn default_replay_window(self) -> Duration {
        match self {
            Self::Signed => Duration::from_millis(30_000),
            Self::Token => Duration::from_millis(60_000),
        }
    }

    /// Whether keys outside the schema are rejected by default.
    pub const fn rejects_unexpected_fields(self) -> bool {
        match self {
            Self::Signed => true,
            Self::Token => false,
        }
    }

    /// Error text returned to the caller on authentication failure.
    pub const fn rejection_message(self) -> &'static str {
        match self {
            Self::Signed => "Invalid signature",
            Self::Token => "Invalid authentication token",
        }
    }

    /// Lowercase name, as used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Token => "token",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signed" | "hmac" => Ok(Self::Signed),
            "token" => Ok(Self::Token),
            other => Err(format!("unknown auth scheme '{other}', expected 'signed' or 'token'")),
        }
    }
}

/// Checks the authenticity proof attached to a request.
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// Scheme implemented by this authenticator.
    fn scheme(&self) -> AuthScheme;

    /// Returns `true` only when `proof` is present and matches the value
    /// recomputed from the shared secret (and `payload`, for signed requests).
    fn authenticate(&self, payload: &Payload, proof: Option<&str>) -> bool;
}

/// HMAC-SHA256 over the canonical body, keyed with the shared secret.
pub struct SignedPayloadAuthenticator {
    secret: Vec<u8>,
}

impl SignedPayloadAuthenticator {
    /// Creates an authenticator for `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self { secret: secret.as_ref().to_vec() }
    }

    /// Computes the hex signature a legitimate client sends for `payload`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidSecret` if the key is rejected.
    pub fn sign(&self, payload: &Payload) -> Result<String, CryptoError> {
        hmac_sha256_hex(canonical_json(payload).as_bytes(), &self.secret)
    }
}

impl fmt::Debug for SignedPayloadAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedPayloadAuthenticator").field("secret", &"<redacted>").finish()
    }
}

impl Authenticator for SignedPayloadAuthenticator {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Signed
    }

    fn authenticate(&self, payload: &Payload, proof: Option<&str>) -> bool {
        let Some(proof) = proof else { return false };

        match self.sign(payload) {
            Ok(expected) => constant_time_eq(proof, &expected),
            Err(_) => false,
        }
    }
}

/// Bearer token equal to the hex SHA-256 of the shared secret.
pub struct SharedTokenAuthenticator {
    expected: String,
}

impl SharedTokenAuthenticator {
    /// Creates an authenticator, hashing `secret` once.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self { expected: Self::token_for(secret) }
    }

    /// The token a legitimate client presents for `secret`.
    pub fn token_for(secret: impl AsRef<[u8]>) -> String {
        sha256_hex(secret.as_ref())
    }
}

impl fmt::Debug for SharedTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTokenAuthenticator").field("expected", &"<redacted>").finish()
    }
}

impl Authenticator for SharedTokenAuthenticator {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Token
    }

    fn authenticate(&self, _payload: &Payload, proof: Option<&str>) -> bool {
        proof.is_some_and(|proof| constant_time_eq(proof, &self.expected))
    }
}

/// Builds the authenticator for `scheme`.
pub fn authenticator_for(scheme: AuthScheme, secret: &str) -> Box<dyn Authenticator> {
    match scheme {
        AuthScheme::Signed => Box::new(SignedPayloadAuthenticator::new(secret)),
        AuthScheme::Token => Box::new(SharedTokenAuthenticator::new(secret)),
    }
}
