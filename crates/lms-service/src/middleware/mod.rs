//! HTTP middleware.
//!
//! - `auth` - bearer token authentication
//! - `http_metrics` - per-request metrics

pub mod auth;
pub mod http_metrics;

pub use auth::authenticate;
pub use http_metrics::http_metrics_middleware;
