//! Payload builders with valid defaults.
//!
//! Every builder starts from a payload that passes validation at the given
//! timestamp; tests then break exactly the part they care about.

use kryos_core::Payload;
use serde_json::{json, Value};

/// Builder for inbound payloads.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    payload: Payload,
}

impl PayloadBuilder {
    /// Valid execution log stamped at `timestamp_ms`.
    pub fn logs(timestamp_ms: i64) -> Self {
        Self::from_value(json!({
            "userId": "1234567",
            "playerName": "builder",
            "displayName": "Builder",
            "accountAge": "365",
            "jobId": "0c1e55aa-6b2f-4c1e-9d0a-3f5e2b7c9a10",
            "placeId": "109983668079237",
            "playersCount": "7",
            "executor": "studio",
            "position": "10, 4, -2",
            "timestamp": timestamp_ms
        }))
    }

    /// Valid brainrot notification with `generation` stamped at `timestamp_ms`.
    pub fn brainrot(generation: &str, timestamp_ms: i64) -> Self {
        Self::from_value(json!({
            "brainrotName": "Tralalero Tralala",
            "generation": generation,
            "placeId": "109983668079237",
            "jobId": "0c1e55aa-6b2f-4c1e-9d0a-3f5e2b7c9a10",
            "timestamp": timestamp_ms
        }))
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(payload) => Self { payload },
            _ => Self { payload: Payload::new() },
        }
    }

    /// Sets or replaces a field, keeping its position if it existed.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Removes a field.
    #[must_use]
    pub fn without(mut self, key: &str) -> Self {
        self.payload.shift_remove(key);
        self
    }

    /// Reverses key order. Does not change the payload's meaning.
    #[must_use]
    pub fn reversed(self) -> Self {
        let mut entries: Vec<(String, Value)> = self.payload.into_iter().collect();
        entries.reverse();
        Self { payload: entries.into_iter().collect() }
    }

    /// Builds the payload.
    pub fn build(self) -> Payload {
        self.payload
    }
}
