//! Learning-management service library
//!
//! Users register and log in for an access token; administrators and
//! instructors manage courses, lessons and assignments; students submit
//! answers.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - JWT signing/verification, password hashing
//! - `errors` - Error types and their HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and HTTP metrics
//! - `models` - Data models
//! - `observability` - Metrics and log-safe hashing
//! - `repositories` - Database access layer
//! - `routes` - Router and application state
//! - `services` - Business logic layer
//! - `store` - Shared key-value store (rate limiting, caching)

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod store;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
