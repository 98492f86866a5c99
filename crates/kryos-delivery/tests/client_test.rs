//! Integration tests for message delivery.
//!
//! Builds messages from raw payloads the way the relay does and checks what
//! actually reaches the destination.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use kryos_core::{BrainrotPayload, LogsPayload, Payload, Tier};
use kryos_delivery::{
    embed::{brainrot_message, logs_message},
    DeliveryClient, DeliveryError,
};
use serde_json::{json, Value};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[tokio::test]
async fn logs_embed_reaches_destination() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/logs"))
        .and(matchers::body_partial_json(json!({
            "embeds": [{
                "color": 0x1ABC9C,
                "timestamp": "2026-03-04T05:06:07.000Z",
                "thumbnail": {
                    "url": "https://www.roblox.com/headshot-thumbnail/image?userId=42&width=150&height=150&format=png"
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = payload(json!({
        "userId": 42,
        "playerName": "builder",
        "displayName": "Builder",
        "accountAge": 365,
        "jobId": "job-1",
        "placeId": "1000",
        "playersCount": 7,
        "executor": "studio",
        "position": "1, 2, 3",
        "timestamp": 1
    }));
    let logs = LogsPayload::from(&raw);
    let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();

    let client = DeliveryClient::with_defaults().unwrap();
    let response =
        client.deliver(&format!("{}/logs", mock_server.uri()), &logs_message(&logs, at)).await;

    assert_eq!(response.unwrap().status_code, 204);
}

#[tokio::test]
async fn brainrot_embed_carries_original_generation_text() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/tier/5m"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = payload(json!({
        "brainrotName": "Tralalero",
        "generation": "$7.5M/s",
        "placeId": "1000",
        "jobId": "job-1",
        "timestamp": 1
    }));
    let brainrot = BrainrotPayload::from(&raw);
    let message = brainrot_message(&brainrot, Tier::T5m, Utc::now());

    let client = DeliveryClient::with_defaults().unwrap();
    client.deliver(&format!("{}/tier/5m", mock_server.uri()), &message).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["embeds"][0]["fields"][1]["value"], "```$7.5M/s```");
    assert_eq!(body["embeds"][0]["color"], 0xFFCC00);
}

#[tokio::test]
async fn rejected_delivery_keeps_status() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let raw = payload(json!({"brainrotName": "x", "generation": "1", "placeId": "1", "jobId": "j"}));
    let message = brainrot_message(&BrainrotPayload::from(&raw), Tier::T250k, Utc::now());

    let client = DeliveryClient::with_defaults().unwrap();
    let error = client.deliver(&mock_server.uri(), &message).await.unwrap_err();

    assert!(matches!(error, DeliveryError::ClientError { status_code: 429, .. }));
}
