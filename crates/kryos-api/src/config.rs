//! Configuration for the Kryos relay.

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use kryos_core::{AuthScheme, Tier};
use kryos_delivery::ClientConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Shared secret. Never printed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for building authenticators only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether no secret was configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Complete relay configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The secret and every destination URL have no usable default and must be
/// provided.
///
/// # Example
///
/// ```no_run
/// use kryos_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Relay will bind to {}:{} ({})", config.host, config.port, config.auth_scheme);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Authentication
    /// Shared secret known to the game client and the relay.
    ///
    /// Environment variable: `SECRET_KEY`
    #[serde(default, alias = "SECRET_KEY")]
    pub secret_key: Secret,
    /// Authenticity scheme in force: `signed` or `token`.
    ///
    /// Environment variable: `AUTH_SCHEME`
    #[serde(default = "default_auth_scheme", alias = "AUTH_SCHEME")]
    pub auth_scheme: AuthScheme,
    /// Anti-replay window override in milliseconds.
    ///
    /// Environment variable: `REPLAY_WINDOW_MS`
    #[serde(default, alias = "REPLAY_WINDOW_MS")]
    pub replay_window_ms: Option<u64>,
    /// Override for rejecting keys outside the endpoint schema.
    ///
    /// Environment variable: `REJECT_UNEXPECTED_FIELDS`
    #[serde(default, alias = "REJECT_UNEXPECTED_FIELDS")]
    pub reject_unexpected_fields: Option<bool>,

    // Destinations
    /// Execution log destination.
    ///
    /// Environment variable: `WEBHOOK_LOGS`
    #[serde(default, alias = "WEBHOOK_LOGS")]
    pub webhook_logs: String,
    /// Destination for generation above 250k.
    ///
    /// Environment variable: `WEBHOOK_250K`
    #[serde(default, alias = "WEBHOOK_250K")]
    pub webhook_250k: String,
    /// Destination for generation above 1M.
    ///
    /// Environment variable: `WEBHOOK_1M`
    #[serde(default, alias = "WEBHOOK_1M")]
    pub webhook_1m: String,
    /// Destination for generation above 5M.
    ///
    /// Environment variable: `WEBHOOK_5M`
    #[serde(default, alias = "WEBHOOK_5M")]
    pub webhook_5m: String,
    /// Destination for generation above 10M.
    ///
    /// Environment variable: `WEBHOOK_10M`
    #[serde(default, alias = "WEBHOOK_10M")]
    pub webhook_10m: String,
    /// Destination for generation above 50M.
    ///
    /// Environment variable: `WEBHOOK_50M`
    #[serde(default, alias = "WEBHOOK_50M")]
    pub webhook_50m: String,
    /// Optional destination for rejected-request alerts.
    ///
    /// Environment variable: `WEBHOOK_SECURITY`
    #[serde(default, alias = "WEBHOOK_SECURITY")]
    pub webhook_security: Option<String>,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// Inbound request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Client
    /// Outbound webhook call timeout in seconds.
    ///
    /// Environment variable: `DELIVERY_TIMEOUT_SECONDS`
    #[serde(default = "default_delivery_timeout", alias = "DELIVERY_TIMEOUT_SECONDS")]
    pub delivery_timeout_seconds: u64,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Fails when a value cannot be parsed or the result does not validate.
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed("")),
        )
    }

    /// Extracts and validates configuration from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Fails when a value cannot be parsed or the result does not validate.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Destination for a brainrot notification of `tier`.
    pub fn destination_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::T250k => &self.webhook_250k,
            Tier::T1m => &self.webhook_1m,
            Tier::T5m => &self.webhook_5m,
            Tier::T10m => &self.webhook_10m,
            Tier::T50m => &self.webhook_50m,
        }
    }

    /// Execution log destination.
    pub fn logs_destination(&self) -> &str {
        &self.webhook_logs
    }

    /// Security alert destination, when configured.
    pub fn security_destination(&self) -> Option<&str> {
        self.webhook_security.as_deref().filter(|url| !url.is_empty())
    }

    /// Anti-replay window override, if any.
    pub fn replay_window(&self) -> Option<Duration> {
        self.replay_window_ms.map(Duration::from_millis)
    }

    /// Inbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Convert to client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.delivery_timeout_seconds),
            ..ClientConfig::default()
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            anyhow::bail!("SECRET_KEY must be set");
        }

        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.delivery_timeout_seconds == 0 {
            anyhow::bail!("delivery_timeout_seconds must be greater than 0");
        }

        if self.replay_window_ms == Some(0) {
            anyhow::bail!("replay_window_ms must be greater than 0");
        }

        let destinations = [
            ("WEBHOOK_LOGS", self.webhook_logs.as_str()),
            ("WEBHOOK_250K", self.webhook_250k.as_str()),
            ("WEBHOOK_1M", self.webhook_1m.as_str()),
            ("WEBHOOK_5M", self.webhook_5m.as_str()),
            ("WEBHOOK_10M", self.webhook_10m.as_str()),
            ("WEBHOOK_50M", self.webhook_50m.as_str()),
        ];
        for (name, url) in destinations {
            if !is_http_url(url) {
                anyhow::bail!("{name} must be an http(s) URL");
            }
        }

        if let Some(url) = self.security_destination() {
            if !is_http_url(url) {
                anyhow::bail!("WEBHOOK_SECURITY must be an http(s) URL");
            }
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| url.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: Secret::default(),
            auth_scheme: default_auth_scheme(),
            replay_window_ms: None,
            reject_unexpected_fields: None,
            webhook_logs: String::new(),
            webhook_250k: String::new(),
            webhook_1m: String::new(),
            webhook_5m: String::new(),
            webhook_10m: String::new(),
            webhook_50m: String::new(),
            webhook_security: None,
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            delivery_timeout_seconds: default_delivery_timeout(),
            rust_log: default_log_level(),
        }
    }
}

fn default_auth_scheme() -> AuthScheme {
    AuthScheme::Signed
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_delivery_timeout() -> u64 {
    kryos_delivery::DEFAULT_TIMEOUT_SECONDS
}

fn default_log_level() -> String {
    "info".to_string()
}
