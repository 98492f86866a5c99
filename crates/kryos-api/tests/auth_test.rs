//! Integration tests for request authentication.
//!
//! Covers both proof schemes and the ordering guarantee that nothing is
//! validated or dispatched for an unauthenticated request.

use axum::http::StatusCode;
use kryos_core::{crypto::hmac_sha256_hex, AuthScheme};
use kryos_testing::{PayloadBuilder, TestEnv, LOGS_PATH, TEST_SECRET};

#[tokio::test]
async fn signed_request_is_accepted() {
    let env = TestEnv::new().await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();

    let response = env.post("/api/logs", &payload).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
}

#[tokio::test]
async fn key_order_does_not_matter_for_signature() {
    let env = TestEnv::new().await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();
    let signature = env.proof_for(&payload);
    let reordered = PayloadBuilder::logs(env.now_ms()).reversed().build();

    let response = env.send(env.request_with_proof("/api/logs", &reordered, Some(&signature))).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn integral_float_is_signed_as_integer() {
    let env = TestEnv::new().await;
    let as_sent_by_client = PayloadBuilder::logs(env.now_ms()).build();
    let signature = env.proof_for(&as_sent_by_client);
    let with_float =
        PayloadBuilder::logs(env.now_ms()).set("timestamp", env.now_ms() as f64).build();

    let body = serde_json::to_vec(&with_float).unwrap();
    assert!(String::from_utf8_lossy(&body).contains(".0"));

    let response = env.send(env.raw_request("/api/logs", body, Some(&signature))).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let env = TestEnv::new().await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();

    let response = env.send(env.request_with_proof("/api/logs", &payload, None)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), Some("Invalid signature"));
    env.http_mock.assert_delivered(LOGS_PATH, 0).await;
}

#[tokio::test]
async fn tampered_payload_is_rejected() {
    let env = TestEnv::new().await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();
    let signature = env.proof_for(&payload);
    let tampered = PayloadBuilder::logs(env.now_ms()).set("playerName", "someone_else").build();

    let response = env.send(env.request_with_proof("/api/logs", &tampered, Some(&signature))).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    env.http_mock.assert_delivered(LOGS_PATH, 0).await;
}

#[tokio::test]
async fn signature_over_unsorted_body_is_rejected() {
    let env = TestEnv::new().await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();
    let unsorted = serde_json::to_string(&payload).unwrap();
    let signature = hmac_sha256_hex(unsorted.as_bytes(), TEST_SECRET.as_bytes()).unwrap();

    let response = env.send(env.request_with_proof("/api/logs", &payload, Some(&signature))).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authentication_runs_before_validation() {
    let env = TestEnv::new().await;
    let invalid = PayloadBuilder::logs(0).without("userId").build();

    let response = env.send(env.request_with_proof("/api/logs", &invalid, Some("deadbeef"))).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), Some("Invalid signature"));
}

#[tokio::test]
async fn malformed_json_is_rejected_before_authentication() {
    let env = TestEnv::new().await;

    let response = env.send(env.raw_request("/api/logs", "{\"userId\":", None)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), Some("Invalid JSON body"));

    let response = env.send(env.raw_request("/api/brainrot", "[1,2,3]", Some("abc"))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), Some("Invalid JSON body"));
}

#[tokio::test]
async fn token_request_is_accepted() {
    let env = TestEnv::with_scheme(AuthScheme::Token).await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();

    let response = env.post("/api/logs", &payload).await;

    assert_eq!(response.status, StatusCode::OK);
    env.http_mock.assert_delivered(LOGS_PATH, 1).await;
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let env = TestEnv::with_scheme(AuthScheme::Token).await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();

    let response = env.send(env.request_with_proof("/api/logs", &payload, Some(TEST_SECRET))).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), Some("Invalid authentication token"));
}

#[tokio::test]
async fn signature_header_does_not_satisfy_token_scheme() {
    let env = TestEnv::with_scheme(AuthScheme::Token).await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();
    let signature = hmac_sha256_hex(b"anything", TEST_SECRET.as_bytes()).unwrap();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/logs")
        .header("content-type", "application/json")
        .header("x-signature", signature)
        .body(axum::body::Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();
    let response = env.send(request).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejections_never_echo_the_secret() {
    let env = TestEnv::new().await;
    let payload = PayloadBuilder::logs(env.now_ms()).build();

    let response = env.send(env.request_with_proof("/api/logs", &payload, Some("x"))).await;

    assert!(!response.body.to_string().contains(TEST_SECRET));
}
