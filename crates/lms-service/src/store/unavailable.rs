//! Store double whose every operation fails.
//!
//! Used to check that callers surface `StoreUnavailable` instead of
//! skipping the rate limit or serving stale data.

use super::KvStore;
use crate::errors::LmsError;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

fn unavailable<T>() -> Result<T, LmsError> {
    Err(LmsError::StoreUnavailable("store is unreachable".to_string()))
}

#[async_trait]
impl KvStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, LmsError> {
        unavailable()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), LmsError> {
        unavailable()
    }

    async fn incr_with_ttl(&self, _key: &str, _ttl: Duration) -> Result<u64, LmsError> {
        unavailable()
    }

    async fn ttl(&self, _key: &str) -> Result<Option<Duration>, LmsError> {
        unavailable()
    }

    async fn delete(&self, _key: &str) -> Result<(), LmsError> {
        unavailable()
    }

    async fn ping(&self) -> Result<(), LmsError> {
        unavailable()
    }
}
