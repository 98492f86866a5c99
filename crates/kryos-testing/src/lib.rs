//! Test infrastructure for the Kryos relay.
//!
//! A [`TestEnv`] wires a real router to mock webhook destinations and a
//! controllable clock, and signs requests the way a game client would.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use kryos_api::{config::Secret, create_router, AppState, Config};
use kryos_core::{
    AuthScheme, Clock, Payload, SharedTokenAuthenticator, SignedPayloadAuthenticator, Tier,
};
use serde_json::Value;
use tower::ServiceExt;

pub mod fixtures;
pub mod http;

pub use fixtures::PayloadBuilder;
pub use http::{tier_path, MockResponse, MockServer, LOGS_PATH, SECURITY_PATH};
pub use kryos_core::TestClock;

/// Shared secret used by every test environment.
pub const TEST_SECRET: &str = "kryos_test_secret_0123456789";

/// Fixed start time of the test clock, in milliseconds.
pub const TEST_NOW_MS: i64 = 1_700_000_000_000;

/// Test environment for driving the relay end to end.
pub struct TestEnv {
    /// Mock server standing in for every webhook destination
    pub http_mock: MockServer,
    /// Deterministic clock shared with the relay
    pub clock: TestClock,
    /// Configuration the relay was built from
    pub config: Config,
    router: Router,
}

/// Response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::Null` if the body was not JSON.
    pub body: Value,
}

impl TestResponse {
    /// The `error` string of an error body.
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

impl TestEnv {
    /// Signed-scheme environment with every destination accepting.
    pub async fn new() -> Self {
        Self::with_scheme(AuthScheme::Signed).await
    }

    /// Environment for `scheme` with every destination accepting.
    pub async fn with_scheme(scheme: AuthScheme) -> Self {
        Self::with_config(scheme, |_| {}).await
    }

    /// Environment for `scheme`, with a hook to adjust configuration before
    /// the router is built.
    pub async fn with_config(scheme: AuthScheme, customize: impl FnOnce(&mut Config)) -> Self {
        let http_mock = MockServer::start().await;

        http_mock.mock_destination(LOGS_PATH, MockResponse::Accept).await;
        http_mock.mock_destination(SECURITY_PATH, MockResponse::Accept).await;
        for tier in Tier::ALL {
            http_mock.mock_destination(&tier_path(tier), MockResponse::Accept).await;
        }

        let mut config = Config {
            secret_key: Secret::new(TEST_SECRET),
            auth_scheme: scheme,
            webhook_logs: http_mock.endpoint_url(LOGS_PATH),
            webhook_250k: http_mock.endpoint_url(&tier_path(Tier::T250k)),
            webhook_1m: http_mock.endpoint_url(&tier_path(Tier::T1m)),
            webhook_5m: http_mock.endpoint_url(&tier_path(Tier::T5m)),
            webhook_10m: http_mock.endpoint_url(&tier_path(Tier::T10m)),
            webhook_50m: http_mock.endpoint_url(&tier_path(Tier::T50m)),
            host: "127.0.0.1".to_string(),
            ..Config::default()
        };
        customize(&mut config);
        config.validate().expect("test configuration must be valid");

        let clock = TestClock::with_start_millis(TEST_NOW_MS);
        let state = AppState::with_clock(config.clone(), Arc::new(clock.clone()))
            .expect("Failed to build app state");

        Self { http_mock, clock, config, router: create_router(state) }
    }

    /// Current test time in milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Router under test.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Proof a well-behaved client would attach to `payload`.
    pub fn proof_for(&self, payload: &Payload) -> String {
        match self.config.auth_scheme {
            AuthScheme::Signed => SignedPayloadAuthenticator::new(TEST_SECRET)
                .sign(payload)
                .expect("HMAC accepts any key"),
            AuthScheme::Token => SharedTokenAuthenticator::token_for(TEST_SECRET),
        }
    }

    /// POST `payload` to `path` with a correct proof.
    pub fn authenticated_request(&self, path: &str, payload: &Payload) -> Request<Body> {
        let proof = self.proof_for(payload);
        self.request_with_proof(path, payload, Some(&proof))
    }

    /// POST `payload` to `path` with an arbitrary proof (or none).
    pub fn request_with_proof(
        &self,
        path: &str,
        payload: &Payload,
        proof: Option<&str>,
    ) -> Request<Body> {
        let body = serde_json::to_vec(payload).expect("payload serializes");
        self.raw_request(path, body, proof)
    }

    /// POST raw bytes to `path`.
    pub fn raw_request(
        &self,
        path: &str,
        body: impl Into<Body>,
        proof: Option<&str>,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(proof) = proof {
            builder = builder.header(self.config.auth_scheme.header_name(), proof);
        }

        builder.body(body.into()).expect("valid request")
    }

    /// Sends a request through the router and captures the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, headers, body }
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder().uri(path).body(Body::empty()).expect("valid request");
        self.send(request).await
    }

    /// POST `payload` to `path` with a correct proof.
    pub async fn post(&self, path: &str, payload: &Payload) -> TestResponse {
        self.send(self.authenticated_request(path, payload)).await
    }
}
