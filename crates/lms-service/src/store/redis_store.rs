//! Redis-backed store.
//!
//! The multiplexed connection is cheap to clone and safe to use from many
//! tasks, so each operation clones it instead of locking.

use super::KvStore;
use crate::errors::LmsError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Script};
use std::time::Duration;
use tracing::{error, warn};

/// INCR and set the expiry only when the counter was just created, in one
/// atomic step. A crash between two separate commands could otherwise leave
/// a counter that never expires.
const INCR_WITH_TTL: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    incr_with_ttl_script: Script,
}

impl RedisStore {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::StoreUnavailable` if the client cannot be opened or
    /// the initial connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self, LmsError> {
        // Do not log redis_url: it may embed a password.
        let client = Client::open(redis_url).map_err(|e| {
            error!(target: "lms.store.redis", error = %e, "Failed to open Redis client");
            LmsError::StoreUnavailable(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!(target: "lms.store.redis", error = %e, "Failed to connect to Redis");
                LmsError::StoreUnavailable(format!("Failed to connect to Redis: {e}"))
            })?;

        Ok(Self {
            connection,
            incr_with_ttl_script: Script::new(INCR_WITH_TTL),
        })
    }
}

fn store_error(operation: &'static str, e: redis::RedisError) -> LmsError {
    warn!(
        target: "lms.store.redis",
        operation = operation,
        error = %e,
        "Redis operation failed"
    );
    LmsError::StoreUnavailable(format!("Redis {operation} failed: {e}"))
}

/// Redis expiries are whole milliseconds; never round a live TTL down to 0.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LmsError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| store_error("get", e))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LmsError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .pset_ex(key, value, ttl_millis(ttl))
            .await
            .map_err(|e| store_error("set", e))?;
        Ok(())
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> Result<u64, LmsError> {
        let mut conn = self.connection.clone();
        let count: i64 = self
            .incr_with_ttl_script
            .key(key)
            .arg(ttl_millis(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| store_error("incr_with_ttl", e))?;

        u64::try_from(count)
            .map_err(|_| LmsError::StoreUnavailable(format!("Counter at {key} is negative")))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, LmsError> {
        let mut conn = self.connection.clone();
        // -2: missing, -1: no expiry
        let millis: i64 = conn.pttl(key).await.map_err(|e| store_error("ttl", e))?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    async fn delete(&self, key: &str) -> Result<(), LmsError> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(|e| store_error("delete", e))?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), LmsError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("ping", e))?;
        Ok(())
    }
}
