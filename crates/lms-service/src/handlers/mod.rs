//! HTTP request handlers.
//!
//! Handlers that need a caller take `Option<Extension<Principal>>` and run
//! the access policy first; the auth middleware only resolves identity.

pub mod auth_handler;
pub mod course_handler;
pub mod health;
pub mod submission_handler;
pub mod user_handler;

pub use health::{health_check, metrics_handler, readiness_check};
