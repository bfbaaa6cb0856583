//! Fixed-window limiter for failed logins.
//!
//! Every attempt reserves a slot with one atomic increment before the
//! password is checked. A window opens at the first reservation from a
//! client and lasts `window` from that moment; later reservations never
//! extend it. When the window expires the count is gone and the client
//! starts over. A successful login deletes the window, so only failed
//! attempts accumulate.

use crate::config::Config;
use crate::errors::LmsError;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{record_rate_limit_decision, record_store_error};
use crate::store::KvStore;
use std::sync::Arc;
use std::time::Duration;

const KEY_PREFIX: &str = "rl:login:";

/// Store key holding the attempt count for `client`.
pub fn window_key(client: &str) -> String {
    format!("{}{}", KEY_PREFIX, client)
}

#[derive(Clone)]
pub struct LoginRateLimiter {
    store: Arc<dyn KvStore>,
    max_attempts: u32,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(store: Arc<dyn KvStore>, max_attempts: u32, window: Duration) -> Self {
        Self {
            store,
            max_attempts,
            window,
        }
    }

    pub fn from_config(store: Arc<dyn KvStore>, config: &Config) -> Self {
        Self::new(
            store,
            config.rate_limit_max_attempts,
            Duration::from_secs(config.rate_limit_window_seconds),
        )
    }

    /// Reserve one login attempt for `client` before credentials are examined.
    ///
    /// The counter is incremented first and the decision is made on the
    /// value the increment returned, so concurrent attempts each get a
    /// distinct count and at most `max_attempts` of them pass per window.
    /// Returns the number of attempts counted in the window so far.
    ///
    /// # Errors
    ///
    /// - `TooManyAttempts` once the reservation exceeds `max_attempts`,
    ///   whatever the outcome of this attempt would have been
    /// - `StoreUnavailable` if the count cannot be taken; the attempt is not
    ///   let through
    pub async fn reserve(&self, client: &str) -> Result<u64, LmsError> {
        let key = window_key(client);

        let attempts = self
            .store
            .incr_with_ttl(&key, self.window)
            .await
            .map_err(|e| store_failure("incr_with_ttl", client, e))?;

        if attempts <= u64::from(self.max_attempts) {
            record_rate_limit_decision("allowed");
            tracing::debug!(
                target: "lms.rate_limit",
                client = %hash_for_correlation(client),
                attempts = attempts,
                max_attempts = self.max_attempts,
                "Login attempt reserved"
            );
            return Ok(attempts);
        }

        let remaining = self
            .store
            .ttl(&key)
            .await
            .map_err(|e| store_failure("ttl", client, e))?
            .unwrap_or(self.window);
        let retry_after_seconds = ceil_secs(remaining).max(1);

        record_rate_limit_decision("rejected");
        tracing::warn!(
            target: "lms.rate_limit",
            client = %hash_for_correlation(client),
            attempts = attempts,
            retry_after_seconds = retry_after_seconds,
            "Login blocked by rate limit"
        );

        Err(LmsError::TooManyAttempts {
            retry_after_seconds,
        })
    }

    /// Clear the client's window after a successful login.
    pub async fn record_success(&self, client: &str) -> Result<(), LmsError> {
        self.store
            .delete(&window_key(client))
            .await
            .map_err(|e| store_failure("delete", client, e))
    }
}

fn store_failure(operation: &'static str, client: &str, e: LmsError) -> LmsError {
    record_store_error(operation);
    tracing::error!(
        target: "lms.rate_limit",
        operation = operation,
        client = %hash_for_correlation(client),
        error = %e,
        "Rate limit store unavailable, rejecting login"
    );
    match e {
        LmsError::StoreUnavailable(_) => e,
        other => LmsError::StoreUnavailable(other.to_string()),
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
