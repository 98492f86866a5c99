//! Request-level plumbing shared by every route.
//!
//! `request_id` tags each request; `auth` turns a raw body into an
//! authenticated payload before a handler sees it.

pub mod auth;
pub mod request_id;

pub use auth::{AuthenticatedPayload, MAX_PENDING_SECURITY_ALERTS};
pub use request_id::{inject_request_id, RequestId, REQUEST_ID_HEADER};
