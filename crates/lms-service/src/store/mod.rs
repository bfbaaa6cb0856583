//! Shared key-value store backing the login rate limiter and the course cache.
//!
//! Handlers never touch a process-wide global: an `Arc<dyn KvStore>` is built
//! at startup and injected through `AppState`. Production uses Redis; tests
//! and single-instance deployments use [`MemoryStore`], whose expiry follows
//! `tokio::time` and can therefore be driven with a paused clock.

mod memory;
mod redis_store;
mod unavailable;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;
pub use self::unavailable::UnavailableStore;

use crate::errors::LmsError;
use async_trait::async_trait;
use std::time::Duration;

/// Operations the rate limiter and cache need from a store.
///
/// Every operation is fallible: callers propagate a store failure instead of
/// silently bypassing the control that depends on it.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, LmsError>;

    /// Store `value` under `key`, expiring `ttl` from now.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LmsError>;

    /// Atomically increment the counter at `key` and return the new value.
    ///
    /// A missing or expired counter starts at 1 and expires `ttl` from now.
    /// Incrementing a live counter keeps its original expiry.
    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> Result<u64, LmsError>;

    /// Remaining lifetime of `key`, or `None` if absent or without expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, LmsError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), LmsError>;

    /// Cheap liveness probe used by the readiness endpoint.
    async fn ping(&self) -> Result<(), LmsError>;
}
