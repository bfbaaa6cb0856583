//! Observability for the LMS service.
//!
//! # Privacy by Default
//!
//! Handlers and crypto helpers use `#[instrument(skip_all)]` and log an
//! explicit allow-list of fields. Fields fall into three groups:
//! - **SAFE**: logged in plaintext (roles, outcomes, counts)
//! - **HASHED**: logged as a truncated SHA-256 for correlation (client
//!   address, username)
//! - **NEVER**: never logged (passwords, tokens, the token secret)

pub mod metrics;

use crate::errors::LmsError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// Not a secret-protecting hash: it only lets several log lines about the
/// same client be matched without printing the client identifier.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Error categories for metric labels (bounded cardinality).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing, invalid or expired credentials; rate limiting
    Authentication,
    /// Authenticated but not permitted
    Authorization,
    /// Bad request input or missing resource
    Client,
    /// Store, database, crypto and other server faults
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Client => "client",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&LmsError> for ErrorCategory {
    fn from(err: &LmsError) -> Self {
        match err {
            LmsError::InvalidCredentials
            | LmsError::Unauthenticated
            | LmsError::InvalidToken(_)
            | LmsError::ExpiredToken
            | LmsError::TooManyAttempts { .. } => ErrorCategory::Authentication,
            LmsError::Forbidden { .. } => ErrorCategory::Authorization,
            LmsError::NotFound(_) | LmsError::Validation(_) => ErrorCategory::Client,
            LmsError::Database(_)
            | LmsError::StoreUnavailable(_)
            | LmsError::Crypto(_)
            | LmsError::Internal => ErrorCategory::Internal,
        }
    }
}
