//! Request gatekeeping for the Kryos relay.
//!
//! Decides, for every inbound request, whether it is authentic (shared
//! secret proof) and well formed (schema and content checks) before any
//! outbound notification may be triggered. Also owns the generation tiering
//! that picks a destination for brainrot notifications.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod crypto;
pub mod error;
pub mod gatekeeper;
pub mod models;
pub mod tier;
pub mod time;
pub mod validation;

pub use auth::{AuthScheme, Authenticator, SharedTokenAuthenticator, SignedPayloadAuthenticator};
pub use error::{ValidationFailure, ValidationResult};
pub use gatekeeper::{Gatekeeper, Rejection};
pub use models::{BrainrotPayload, LogsPayload, Payload, Schema};
pub use tier::Tier;
pub use time::{Clock, RealClock, TestClock};
pub use validation::PayloadValidator;
