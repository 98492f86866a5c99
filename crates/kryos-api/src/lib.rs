//! Kryos HTTP API.
//!
//! Accepts signed notifications from game clients, runs them through the
//! [`Gatekeeper`] and relays the survivors to the configured webhooks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kryos_core::{Clock, Gatekeeper, RealClock};
use kryos_delivery::{DeliveryClient, DeliveryError};
use tokio::sync::Semaphore;

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Authentication and validation in force.
    pub gatekeeper: Arc<Gatekeeper>,
    /// Outbound webhook client.
    pub delivery: DeliveryClient,
    /// Time source for replay checks and embed timestamps.
    pub clock: Arc<dyn Clock>,
    /// Permits for in-flight security alerts.
    pub alert_permits: Arc<Semaphore>,
}

impl AppState {
    /// Builds state from configuration using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be built.
    pub fn new(config: Config) -> Result<Self, DeliveryError> {
        Self::with_clock(config, Arc::new(RealClock::new()))
    }

    /// Builds state from configuration with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be built.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self, DeliveryError> {
        let gatekeeper = Gatekeeper::for_scheme(
            config.auth_scheme,
            config.secret_key.expose(),
            clock.clone(),
            config.replay_window(),
            config.reject_unexpected_fields,
        );
        let delivery = DeliveryClient::new(config.to_client_config())?;

        Ok(Self {
            config: Arc::new(config),
            gatekeeper: Arc::new(gatekeeper),
            delivery,
            clock,
            alert_permits: Arc::new(Semaphore::new(middleware::MAX_PENDING_SECURITY_ALERTS)),
        })
    }

    /// Current time, for embed timestamps.
    pub fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.clock.now_system())
    }
}
