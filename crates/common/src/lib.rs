//! Common utilities and types shared across the LMS crates.

#![warn(clippy::pedantic)]

/// Module for shared domain types (roles)
pub mod types;

/// Module for secret types that prevent accidental logging
pub mod secret;
