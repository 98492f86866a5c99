//! End-to-end tests for the relay.
//!
//! Drives the full router, from an inbound game-client request to the
//! outbound webhook call, against mock destinations.

use axum::http::StatusCode;
use kryos_core::{crypto::hmac_sha256_hex, AuthScheme, Tier};
use kryos_testing::{tier_path, PayloadBuilder, TestEnv, LOGS_PATH, TEST_SECRET};

/// The golden path: a valid signed execution log is relayed exactly once.
#[tokio::test]
async fn signed_logs_are_relayed_once() {
    let env = TestEnv::with_scheme(AuthScheme::Signed).await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();

    let response = env.post("/api/logs", &payload).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::json!({"success": true}));
    assert!(response.headers.contains_key("x-request-id"));

    env.http_mock.assert_delivered(LOGS_PATH, 1).await;
    assert_eq!(env.http_mock.request_count().await, 1);
}

/// A client that signs its body without sorting the keys is turned away.
#[tokio::test]
async fn unsorted_signature_is_forbidden() {
    let env = TestEnv::with_scheme(AuthScheme::Signed).await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();
    let as_sent = serde_json::to_string(&payload).unwrap();
    let signature = hmac_sha256_hex(as_sent.as_bytes(), TEST_SECRET.as_bytes()).unwrap();

    let response = env.send(env.request_with_proof("/api/logs", &payload, Some(&signature))).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), Some("Invalid signature"));
    assert_eq!(env.http_mock.request_count().await, 0);
}

/// Token scheme, grouped generation text, routed to the 1m tier.
#[tokio::test]
async fn token_brainrot_routes_to_one_million_tier() {
    let env = TestEnv::with_scheme(AuthScheme::Token).await;
    let payload = PayloadBuilder::brainrot("3,000,000", env.now_ms()).build();

    let response = env.post("/api/brainrot", &payload).await;

    assert_eq!(response.status, StatusCode::OK);

    let messages = env.http_mock.received_messages(&tier_path(Tier::T1m)).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["embeds"][0]["color"], 0x00FF00);
    assert_eq!(env.http_mock.request_count().await, 1);
}

/// Generation thresholds, end to end.
#[tokio::test]
async fn generation_routing_table() {
    let env = TestEnv::new().await;

    let routed = [
        ("250000", Tier::T250k),
        ("1000001", Tier::T1m),
        ("5000001", Tier::T5m),
        ("10000001", Tier::T10m),
        ("50000001", Tier::T50m),
    ];
    for (generation, tier) in routed {
        let payload = PayloadBuilder::brainrot(generation, env.now_ms()).build();
        assert_eq!(env.post("/api/brainrot", &payload).await.status, StatusCode::OK);
        env.http_mock.assert_delivered(&tier_path(tier), 1).await;
    }

    for generation in ["249999", "not a number"] {
        let payload = PayloadBuilder::brainrot(generation, env.now_ms()).build();
        let response = env.post("/api/brainrot", &payload).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error(), Some("Generation too low or invalid"));
    }

    assert_eq!(env.http_mock.request_count().await, routed.len());
}
