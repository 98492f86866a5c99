//! Outbound notification delivery.
//!
//! Turns validated payloads into Discord-style webhook messages and posts
//! them to the configured destination. Delivery is single-shot: one attempt,
//! bounded by the client timeout, no retry.
//!
//! # Example
//!
//! ```no_run
//! use kryos_delivery::{embed::WebhookMessage, ClientConfig, DeliveryClient};
//!
//! # async fn example(message: WebhookMessage) -> kryos_delivery::Result<()> {
//! let client = DeliveryClient::new(ClientConfig::default())?;
//! client.deliver("https://discord.com/api/webhooks/1/abc", &message).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod embed;
pub mod error;

pub use client::{ClientConfig, DeliveryClient, DeliveryResponse};
pub use error::{DeliveryError, Result};

/// Default outbound request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;
