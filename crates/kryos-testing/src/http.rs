//! Mock webhook destinations.

use std::time::Duration;

use kryos_core::Tier;
use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer as WiremockServer, ResponseTemplate,
};

/// Path of the logs destination.
pub const LOGS_PATH: &str = "/hooks/logs";

/// Path of the security alert destination.
pub const SECURITY_PATH: &str = "/hooks/security";

/// Path of the destination for `tier`.
pub fn tier_path(tier: Tier) -> String {
    format!("/hooks/tier/{}", tier.label())
}

/// Canned destination behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockResponse {
    /// Accepts the message, as Discord does with `204 No Content`.
    Accept,
    /// Answers with the given non-2xx status.
    Fail(u16),
    /// Accepts the message after holding the request for the given time.
    Slow(Duration),
}

/// Stand-in for every webhook destination the relay posts to.
pub struct MockServer {
    server: WiremockServer,
}

impl MockServer {
    /// Starts a new mock server on a random port.
    pub async fn start() -> Self {
        Self { server: WiremockServer::start().await }
    }

    /// Returns the base URL of the mock server.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Full URL for a destination path.
    pub fn endpoint_url(&self, endpoint_path: &str) -> String {
        format!("{}{}", self.server.uri(), endpoint_path)
    }

    /// Configures `endpoint_path` to answer every POST with `response`.
    pub async fn mock_destination(&self, endpoint_path: &str, response: MockResponse) {
        let template = match response {
            MockResponse::Accept => ResponseTemplate::new(204),
            MockResponse::Fail(status) => ResponseTemplate::new(status),
            MockResponse::Slow(delay) => ResponseTemplate::new(204).set_delay(delay),
        };

        Mock::given(method("POST"))
            .and(path(endpoint_path.to_string()))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// JSON bodies received on `endpoint_path`, oldest first.
    pub async fn received_messages(&self, endpoint_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == endpoint_path)
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Waits up to two seconds for `expected` messages on `endpoint_path`,
    /// for deliveries the relay makes in the background.
    pub async fn wait_for_messages(&self, endpoint_path: &str, expected: usize) -> Vec<Value> {
        for _ in 0..40 {
            let messages = self.received_messages(endpoint_path).await;
            if messages.len() >= expected {
                return messages;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.received_messages(endpoint_path).await
    }

    /// Total number of requests received on any path.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |requests| requests.len())
    }

    /// Asserts that exactly `expected` messages reached `endpoint_path`.
    pub async fn assert_delivered(&self, endpoint_path: &str, expected: usize) {
        let received = self.received_messages(endpoint_path).await.len();
        assert_eq!(
            received, expected,
            "Expected {expected} deliveries to {endpoint_path}, received {received}"
        );
    }
}
