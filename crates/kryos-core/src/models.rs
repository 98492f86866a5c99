//! Inbound payload schemas and the typed views built from validated payloads.

use serde::Serialize;
use serde_json::{Map, Value};

/// Raw inbound JSON object, keys in the order the caller sent them.
pub type Payload = Map<String, Value>;

/// Name of the anti-replay timestamp field shared by every schema.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Shape constraint applied to a present field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// String of one or more ASCII digits.
    Digits,
    /// String with at least one character.
    NonEmptyText,
    /// Any string.
    Text,
}

/// Required fields and per-field rules for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Endpoint name, used in logs.
    pub name: &'static str,
    /// Required fields in check order, `timestamp` included.
    pub required: &'static [&'static str],
    /// Format rules in check order.
    pub rules: &'static [(&'static str, FieldRule)],
}

impl Schema {
    /// Execution log schema served at `/api/logs`.
    pub const LOGS: Self = Self {
        name: "logs",
        required: &[
            "userId",
            "playerName",
            "displayName",
            "accountAge",
            "jobId",
            "placeId",
            "playersCount",
            "executor",
            "position",
            TIMESTAMP_FIELD,
        ],
        rules: &[
            ("userId", FieldRule::Digits),
            ("playerName", FieldRule::NonEmptyText),
            ("accountAge", FieldRule::Digits),
            ("placeId", FieldRule::Digits),
            ("playersCount", FieldRule::Digits),
        ],
    };

    /// Brainrot notification schema served at `/api/brainrot`.
    pub const BRAINROT: Self = Self {
        name: "brainrot",
        required: &["brainrotName", "generation", "placeId", "jobId", TIMESTAMP_FIELD],
        rules: &[
            ("brainrotName", FieldRule::NonEmptyText),
            ("generation", FieldRule::Text),
            ("placeId", FieldRule::Digits),
            ("jobId", FieldRule::NonEmptyText),
        ],
    };

    /// Whether `key` belongs to this schema.
    pub fn allows(&self, key: &str) -> bool {
        self.required.contains(&key)
    }
}

/// Renders a field for display: strings unquoted, anything else as JSON.
fn display_value(payload: &Payload, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Execution log fields, read from a payload that passed `Schema::LOGS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsPayload {
    /// Numeric player id.
    pub user_id: String,
    /// Account name.
    pub player_name: String,
    /// Display name.
    pub display_name: String,
    /// Account age in days.
    pub account_age: String,
    /// Server instance id.
    pub job_id: String,
    /// Numeric place id.
    pub place_id: String,
    /// Players in the server.
    pub players_count: String,
    /// Executor the script ran under.
    pub executor: String,
    /// Player position.
    pub position: String,
}

impl From<&Payload> for LogsPayload {
    fn from(payload: &Payload) -> Self {
        Self {
            user_id: display_value(payload, "userId"),
            player_name: display_value(payload, "playerName"),
            display_name: display_value(payload, "displayName"),
            account_age: display_value(payload, "accountAge"),
            job_id: display_value(payload, "jobId"),
            place_id: display_value(payload, "placeId"),
            players_count: display_value(payload, "playersCount"),
            executor: display_value(payload, "executor"),
            position: display_value(payload, "position"),
        }
    }
}

/// Brainrot notification fields, read from a payload that passed
/// `Schema::BRAINROT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrainrotPayload {
    /// Name of the spotted brainrot.
    pub brainrot_name: String,
    /// Generation exactly as the client sent it, e.g. `"3,000,000/s"`.
    pub generation: String,
    /// Numeric place id.
    pub place_id: String,
    /// Server instance id.
    pub job_id: String,
}

impl From<&Payload> for BrainrotPayload {
    fn from(payload: &Payload) -> Self {
        Self {
            brainrot_name: display_value(payload, "brainrotName"),
            generation: display_value(payload, "generation"),
            place_id: display_value(payload, "placeId"),
            job_id: display_value(payload, "jobId"),
        }
    }
}
