//! Cryptographic primitives behind the authenticity proofs.
//!
//! HMAC-SHA256 over the canonical request body, SHA-256 of the shared secret,
//! and a constant-time comparison for checking either proof.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::models::Payload;

type HmacSha256 = Hmac<Sha256>;

/// Errors raised while computing a proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The key was rejected by the MAC implementation.
    #[error("invalid secret key")]
    InvalidSecret,
}

/// Generates HMAC-SHA256 of `payload` keyed by `secret`, as lowercase hex.
///
/// # Errors
///
/// Returns `CryptoError::InvalidSecret` if the key is rejected.
pub fn hmac_sha256_hex(payload: &[u8], secret: &[u8]) -> Result<String, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| CryptoError::InvalidSecret)?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// SHA-256 of `data` as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Largest integer every JSON client can represent exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Canonical string form of a request body.
///
/// Top-level keys are emitted in ascending lexicographic order; nested
/// objects keep the order they were received in. The output is compact JSON
/// with no insignificant whitespace.
///
/// Floats with no fractional part within the safe integer range are written
/// as integers (`2.0` and `1e3` become `2` and `1000`), as browser and Lua
/// JSON encoders do. Other floats use the shortest round-trip form.
pub fn canonical_json(payload: &Payload) -> String {
    let mut keys: Vec<&String> = payload.keys().collect();
    keys.sort();

    let mut sorted = Payload::with_capacity(payload.len());
    for key in keys {
        if let Some(value) = payload.get(key) {
            sorted.insert(key.clone(), integral_numbers(value.clone()));
        }
    }

    Value::Object(sorted).to_string()
}

fn integral_numbers(value: Value) -> Value {
    match value {
        Value::Number(number) if number.is_f64() => match number.as_f64() {
            Some(float) if float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER => {
                Value::from(float as i64)
            },
            _ => Value::Number(number),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral_numbers).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, integral_numbers(v))).collect())
        },
        other => other,
    }
}

/// Compares two proofs without leaking the position of the first mismatch.
///
/// Length differences are folded into the result instead of returning early.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let max_len = a.len().max(b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
