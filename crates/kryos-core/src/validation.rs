//! Payload validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//! presence, timestamp window, per-field format, mass-mention filter,
//! unexpected keys (strict mode only).

use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

use regex::Regex;
use serde_json::Value;

use crate::{
    error::{ValidationFailure, ValidationResult},
    models::{FieldRule, Payload, Schema, TIMESTAMP_FIELD},
    time::Clock,
};

static MASS_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@everyone|@here|<@[0-9]+>|<@&[0-9]+>")
        .unwrap_or_else(|e| panic!("mention regex: {e}"))
});

/// Validates inbound payloads against a schema.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    clock: Arc<dyn Clock>,
    replay_window: Duration,
    reject_unexpected_fields: bool,
}

impl PayloadValidator {
    /// Creates a validator with the given anti-replay window and strictness.
    pub fn new(clock: Arc<dyn Clock>, replay_window: Duration, reject_unexpected_fields: bool) -> Self {
        Self { clock, replay_window, reject_unexpected_fields }
    }

    /// Anti-replay window in use.
    pub fn replay_window(&self) -> Duration {
        self.replay_window
    }

    /// Whether keys outside the schema are rejected.
    pub fn rejects_unexpected_fields(&self) -> bool {
        self.reject_unexpected_fields
    }

    /// Validates `payload` against `schema`.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationFailure` encountered.
    pub fn validate(&self, payload: &Payload, schema: &Schema) -> ValidationResult {
        for field in schema.required {
            if !payload.get(*field).is_some_and(is_present) {
                return Err(ValidationFailure::MissingField((*field).to_string()));
            }
        }

        let timestamp = payload.get(TIMESTAMP_FIELD).unwrap_or(&Value::Null);
        if !self.is_timestamp_valid(timestamp) {
            return Err(ValidationFailure::ExpiredTimestamp);
        }

        for (field, rule) in schema.rules {
            let value = payload.get(*field).unwrap_or(&Value::Null);
            if !matches_rule(value, *rule) {
                return Err(ValidationFailure::BadFormat((*field).to_string()));
            }
        }

        if contains_mass_mention(payload) {
            return Err(ValidationFailure::PingDetected);
        }

        if self.reject_unexpected_fields {
            if let Some(key) = payload.keys().find(|key| !schema.allows(key)) {
                return Err(ValidationFailure::UnexpectedField(key.clone()));
            }
        }

        Ok(())
    }

    /// Whether `timestamp` is within the replay window of the current time.
    ///
    /// Fails closed when the value cannot be read as epoch milliseconds.
    pub fn is_timestamp_valid(&self, timestamp: &Value) -> bool {
        let Some(requested_at) = parse_timestamp_millis(timestamp) else { return false };

        let now = self.clock.now_millis();
        let window = u64::try_from(self.replay_window.as_millis()).unwrap_or(u64::MAX);

        now.abs_diff(requested_at) < window
    }
}

/// Presence predicate for required fields.
///
/// A field counts as absent when it is `null`, `false`, numeric zero or the
/// empty string. Everything else, including `"0"`, counts as present.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads epoch milliseconds from a JSON number or numeric string.
///
/// Strings are read as an integer prefix: optional surrounding whitespace and
/// sign, then leading ASCII digits; anything after the digits is ignored.
pub fn parse_timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number.as_f64().filter(|n| n.is_finite()).map(|n| n.trunc() as i64)
        }),
        Value::String(text) => parse_integer_prefix(text),
        _ => None,
    }
}

fn parse_integer_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn matches_rule(value: &Value, rule: FieldRule) -> bool {
    match (rule, value) {
        (FieldRule::Digits, Value::String(text)) => is_digit_string(text),
        (FieldRule::NonEmptyText, Value::String(text)) => !text.is_empty(),
        (FieldRule::Text, Value::String(_)) => true,
        _ => false,
    }
}

/// `^[0-9]+$` over ASCII digits.
pub fn is_digit_string(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Whether the serialized payload would ping everyone, here, a user or a role.
pub fn contains_mass_mention(payload: &Payload) -> bool {
    let serialized = Value::Object(payload.clone()).to_string();
    MASS_MENTION.is_match(&serialized)
}
