//! Cache-aside helper over the shared store.
//!
//! Values are stored as JSON snapshots. Readers go through `get_or_load`,
//! writers through `invalidate_after`. A reader holds a shared lock from the
//! lookup until its snapshot is stored, and a writer holds it exclusively
//! from the database write until the invalidation, so within one process a
//! snapshot computed before a write can never land after that write's
//! invalidation. Two readers that miss together may both recompute. Across
//! processes staleness is bounded by the entry's TTL.

use crate::errors::LmsError;
use crate::observability::metrics::{record_cache_lookup, record_store_error};
use crate::store::KvStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Key of the cached course listing (all courses, newest first).
pub const COURSE_LIST_CACHE_KEY: &str = "cache:lms:courses";

#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn KvStore>,
    /// Metric label for lookups through this cache.
    name: &'static str,
    /// Shared by populates, exclusive for write-then-invalidate.
    lock: Arc<RwLock<()>>,
}

impl CacheAside {
    pub fn new(store: Arc<dyn KvStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            lock: Arc::new(RwLock::new(())),
        }
    }

    /// Cached value for `key`, or the result of `load` stored for `ttl`.
    ///
    /// # Errors
    ///
    /// Store failures and any error returned by `load`; nothing is cached
    /// when `load` fails.
    pub async fn get_or_load<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        load: F,
    ) -> Result<T, LmsError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LmsError>>,
    {
        let _populate = self.lock.read().await;

        if let Some(cached) = self.get::<T>(key).await? {
            return Ok(cached);
        }

        let value = load().await?;
        self.set(key, &value, ttl).await?;
        Ok(value)
    }

    /// Run `write`, then drop `key`, with no populate in between.
    ///
    /// The entry is left alone when `write` fails.
    pub async fn invalidate_after<R, F, Fut>(&self, key: &str, write: F) -> Result<R, LmsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, LmsError>>,
    {
        let _exclusive = self.lock.write().await;

        let result = write().await?;
        self.invalidate(key).await?;
        Ok(result)
    }

    /// Cached value for `key`, or `None` on a miss.
    ///
    /// A snapshot that no longer deserializes is dropped and reported as a
    /// miss so the caller recomputes it.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LmsError> {
        let Some(raw) = self
            .store
            .get(key)
            .await
            .map_err(|e| store_failure("get", e))?
        else {
            record_cache_lookup(self.name, "miss");
            tracing::debug!(target: "lms.cache", cache = self.name, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                record_cache_lookup(self.name, "hit");
                tracing::debug!(target: "lms.cache", cache = self.name, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                record_cache_lookup(self.name, "corrupt");
                tracing::warn!(
                    target: "lms.cache",
                    cache = self.name,
                    error = %e,
                    "Discarding unreadable cache entry"
                );
                self.invalidate(key).await?;
                Ok(None)
            }
        }
    }

    /// Store `value` under `key` for `ttl`.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), LmsError> {
        let snapshot = serde_json::to_string(value).map_err(|e| {
            tracing::error!(target: "lms.cache", error = %e, "Failed to serialize cache entry");
            LmsError::Internal
        })?;

        self.store
            .set(key, &snapshot, ttl)
            .await
            .map_err(|e| store_failure("set", e))
    }

    /// Drop `key` so the next read recomputes.
    pub async fn invalidate(&self, key: &str) -> Result<(), LmsError> {
        self.store
            .delete(key)
            .await
            .map_err(|e| store_failure("delete", e))?;
        tracing::debug!(target: "lms.cache", cache = self.name, "Cache invalidated");
        Ok(())
    }
}

fn store_failure(operation: &'static str, e: LmsError) -> LmsError {
    record_store_error(operation);
    tracing::error!(
        target: "lms.cache",
        operation = operation,
        error = %e,
        "Cache store unavailable"
    );
    e
}
