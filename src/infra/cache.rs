//! Redis cache implementation.
//!
//! Provides rate-limit counters and distributed locks on top of a
//! multiplexed connection manager.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use crate::config::{Config, CACHE_PREFIX_LOCK, CACHE_PREFIX_RATE_LIMIT};
use crate::errors::{AppError, AppResult};

/// Compare-and-delete so a lock is only released by its holder.
const RELEASE_SCRIPT: &str = r#"
    if redis.call("GET", KEYS[1]) == ARGV[1] then
        return redis.call("DEL", KEYS[1])
    else
        return 0
    end
"#;

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");
        Ok(Self { connection })
    }

    /// Check connectivity with PING.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Check and increment rate limit counter.
    /// Returns (current_count, is_allowed) tuple.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        if count == 1 {
            // first hit opens the window
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        let count = count as u64;
        Ok((count, count <= max_requests))
    }

    // =========================================================================
    // Distributed Lock Operations
    // =========================================================================

    /// Acquire a distributed lock with custom options.
    ///
    /// Gives up with a retryable `Unavailable` error once retries run out.
    pub async fn acquire_lock_with_options(
        &self,
        resource: &str,
        ttl_seconds: u64,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> AppResult<LockGuard> {
        let key = format!("{}{}", CACHE_PREFIX_LOCK, resource);
        let lock_id = Uuid::new_v4().to_string();
        let mut conn = self.connection.clone();

        for attempt in 0..=max_retries {
            let reply: Option<String> = redis::cmd("SET")
                .arg(&key)
                .arg(&lock_id)
                .arg("NX")
                .arg("EX")
                .arg(ttl_seconds)
                .query_async(&mut conn)
                .await
                .map_err(cache_error)?;

            if reply.is_some() {
                tracing::debug!(resource = %resource, lock_id = %lock_id, "Lock acquired");
                return Ok(LockGuard {
                    cache: Arc::new(self.clone()),
                    key,
                    lock_id,
                    released: false,
                });
            }

            if attempt < max_retries {
                sleep(Duration::from_millis(retry_delay_ms)).await;
            }
        }

        tracing::warn!(resource = %resource, "Failed to acquire lock after retries");
        Err(AppError::unavailable(format!(
            "lock for {} is busy",
            resource
        )))
    }

    /// Release a lock (internal use - prefer using LockGuard).
    async fn release_lock(&self, key: &str, lock_id: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();

        let released: i32 = redis::cmd("EVAL")
            .arg(RELEASE_SCRIPT)
            .arg(1)
            .arg(key)
            .arg(lock_id)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(released == 1)
    }
}

// =============================================================================
// Lock Guard (RAII)
// =============================================================================

/// RAII guard for distributed locks.
/// Automatically releases the lock when dropped.
pub struct LockGuard {
    cache: Arc<Cache>,
    key: String,
    lock_id: String,
    released: bool,
}

impl LockGuard {
    /// Release the lock now instead of on drop.
    pub async fn release(mut self) -> AppResult<()> {
        self.released = true;
        let released = self.cache.release_lock(&self.key, &self.lock_id).await?;
        if !released {
            // TTL expired while held; another holder may own the key now
            tracing::warn!(key = %self.key, "Lock expired before release");
        } else {
            tracing::debug!(key = %self.key, "Lock released");
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            let cache = self.cache.clone();
            let key = std::mem::take(&mut self.key);
            let lock_id = std::mem::take(&mut self.lock_id);

            tokio::spawn(async move {
                if let Err(e) = cache.release_lock(&key, &lock_id).await {
                    tracing::error!(key = %key, error = %e, "Failed to release lock on drop");
                } else {
                    tracing::debug!(key = %key, "Lock released on drop");
                }
            });
        }
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    if e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal() {
        AppError::unavailable(format!("cache: {}", e))
    } else {
        AppError::internal(format!("Cache error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BOOKING_SECTION_TIMEOUT_SECS, DEFAULT_LOCK_RETRIES, DEFAULT_LOCK_RETRY_DELAY_MS,
        DEFAULT_LOCK_TTL_SECONDS,
    };

    #[test]
    fn cache_key_prefixes() {
        assert_eq!(CACHE_PREFIX_RATE_LIMIT, "rate_limit:");
        assert_eq!(CACHE_PREFIX_LOCK, "lock:");
    }

    #[test]
    fn lock_defaults_bound_the_wait() {
        assert_eq!(DEFAULT_LOCK_TTL_SECONDS, 30);
        let max_wait_ms = DEFAULT_LOCK_RETRIES as u64 * DEFAULT_LOCK_RETRY_DELAY_MS;
        assert!(max_wait_ms < DEFAULT_LOCK_TTL_SECONDS * 1000);
        // the locked booking section must finish before the lease expires
        assert!(BOOKING_SECTION_TIMEOUT_SECS < DEFAULT_LOCK_TTL_SECONDS);
    }

    #[test]
    fn release_script_checks_ownership() {
        assert!(RELEASE_SCRIPT.contains("ARGV[1]"));
        assert!(RELEASE_SCRIPT.contains("DEL"));
    }
}
