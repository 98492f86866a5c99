//! HTTP client for webhook delivery with a bounded timeout.
//!
//! One POST per message. Any non-2xx answer, timeout or transport failure is
//! reported as a [`DeliveryError`]; the caller decides what to tell its own
//! client.

use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::Url;
use tracing::{info_span, Instrument};

use crate::{
    embed::WebhookMessage,
    error::{DeliveryError, Result},
    DEFAULT_TIMEOUT_SECONDS,
};

/// Largest response body kept for diagnostics.
const MAX_RESPONSE_BODY_SIZE: usize = 1024;

/// Configuration for the webhook delivery client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for a whole outbound request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: concat!("Kryos-Relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Pooled HTTP client posting webhook messages.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    config: ClientConfig,
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    /// HTTP status code (always 2xx).
    pub status_code: u16,
    /// Total duration of the request.
    pub duration: Duration,
}

impl DeliveryClient {
    /// Creates a new delivery client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                DeliveryError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a new delivery client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Posts `message` as JSON to `url`.
    ///
    /// Webhook URLs embed their own credentials, so only the host is
    /// recorded in traces.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError` if `url` is not a valid URL
    /// - `EncodingError` if the message cannot be serialized
    /// - `Timeout` if no answer arrives within the client timeout
    /// - `NetworkError` for connection failures
    /// - `ClientError` / `ServerError` for non-2xx responses
    pub async fn deliver(&self, url: &str, message: &WebhookMessage) -> Result<DeliveryResponse> {
        let target = Url::parse(url)
            .map_err(|e| DeliveryError::configuration(format!("invalid destination URL: {e}")))?;
        let body = serde_json::to_vec(message)
            .map(Bytes::from)
            .map_err(|e| DeliveryError::encoding(e.to_string()))?;

        let span = info_span!(
            "webhook_delivery",
            host = target.host_str().unwrap_or_default(),
            bytes = body.len()
        );

        async move {
            let start_time = Instant::now();
            tracing::debug!("Starting webhook delivery");

            let response = match self
                .client
                .post(target)
                .header("content-type", "application/json")
                .body(body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let e = e.without_url();
                    let duration = start_time.elapsed();
                    tracing::warn!(duration_ms = duration.as_millis(), "Request failed: {}", e);

                    if e.is_timeout() {
                        return Err(DeliveryError::timeout(self.config.timeout.as_secs()));
                    }
                    if e.is_connect() {
                        return Err(DeliveryError::network(format!("connection failed: {e}")));
                    }
                    return Err(DeliveryError::network(e.to_string()));
                },
            };

            let duration = start_time.elapsed();
            let status_code = response.status().as_u16();

            if response.status().is_success() {
                tracing::info!(
                    status = status_code,
                    duration_ms = duration.as_millis(),
                    "Webhook delivered"
                );
                return Ok(DeliveryResponse { status_code, duration });
            }

            let body = read_body(response).await;
            tracing::warn!(
                status = status_code,
                duration_ms = duration.as_millis(),
                "Destination rejected webhook"
            );
            Err(DeliveryError::from_status(status_code, body))
        }
        .instrument(span)
        .await
    }
}

async fn read_body(response: reqwest::Response) -> String {
    match response.bytes().await {
        Ok(bytes) if bytes.len() > MAX_RESPONSE_BODY_SIZE => {
            let truncated = String::from_utf8_lossy(&bytes[..MAX_RESPONSE_BODY_SIZE]);
            format!("{truncated}... (truncated)")
        },
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => format!("[failed to read response body: {e}]"),
    }
}
