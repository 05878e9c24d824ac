//! Per-room booking leases.
//!
//! A lease gives its holder exclusive right to run the check-then-insert
//! sequence for one room. Production uses a Redis lock so several server
//! processes agree; single-node deployments and tests use in-process mutexes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::cache::{Cache, LockGuard};
use crate::config::{
    DEFAULT_LOCK_RETRIES, DEFAULT_LOCK_RETRY_DELAY_MS, DEFAULT_LOCK_TTL_SECONDS,
    LOCK_RESOURCE_ROOM,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Source of per-room leases.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoomLocks: Send + Sync {
    /// Wait for the room's lease. Fails with `Unavailable` when the wait
    /// exceeds the configured bound.
    async fn acquire(&self, room_id: Uuid) -> AppResult<RoomLease>;
}

enum LeaseInner {
    Distributed(LockGuard),
    Local(OwnedMutexGuard<()>),
    #[cfg(any(test, feature = "test-utils"))]
    Detached,
}

/// Held lease; dropping it releases the room.
pub struct RoomLease {
    room_id: Uuid,
    inner: LeaseInner,
}

impl RoomLease {
    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    /// Lease that guards nothing, for mocked lock sources.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn detached(room_id: Uuid) -> Self {
        Self {
            room_id,
            inner: LeaseInner::Detached,
        }
    }

    /// Release the lease, reporting failures instead of deferring to drop.
    pub async fn release(self) -> AppResult<()> {
        match self.inner {
            LeaseInner::Distributed(guard) => guard.release().await,
            LeaseInner::Local(guard) => {
                drop(guard);
                Ok(())
            }
            #[cfg(any(test, feature = "test-utils"))]
            LeaseInner::Detached => Ok(()),
        }
    }
}

impl std::fmt::Debug for RoomLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomLease")
            .field("room_id", &self.room_id)
            .finish()
    }
}

/// Redis-backed leases shared by every server process.
pub struct RedisRoomLocks {
    cache: Cache,
    ttl_seconds: u64,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl RedisRoomLocks {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            ttl_seconds: DEFAULT_LOCK_TTL_SECONDS,
            max_retries: DEFAULT_LOCK_RETRIES,
            retry_delay_ms: DEFAULT_LOCK_RETRY_DELAY_MS,
        }
    }
}

#[async_trait]
impl RoomLocks for RedisRoomLocks {
    async fn acquire(&self, room_id: Uuid) -> AppResult<RoomLease> {
        let resource = format!("{}{}", LOCK_RESOURCE_ROOM, room_id);
        let guard = self
            .cache
            .acquire_lock_with_options(
                &resource,
                self.ttl_seconds,
                self.max_retries,
                self.retry_delay_ms,
            )
            .await?;

        Ok(RoomLease {
            room_id,
            inner: LeaseInner::Distributed(guard),
        })
    }
}

/// In-process leases: one async mutex per room.
pub struct LocalRoomLocks {
    rooms: DashMap<Uuid, Arc<Mutex<()>>>,
    wait: Duration,
}

impl LocalRoomLocks {
    pub fn new(wait: Duration) -> Self {
        Self {
            rooms: DashMap::new(),
            wait,
        }
    }
}

impl Default for LocalRoomLocks {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            DEFAULT_LOCK_RETRIES as u64 * DEFAULT_LOCK_RETRY_DELAY_MS,
        ))
    }
}

#[async_trait]
impl RoomLocks for LocalRoomLocks {
    async fn acquire(&self, room_id: Uuid) -> AppResult<RoomLease> {
        // clone the Arc so the map shard is not held across the await
        let mutex = self.rooms.entry(room_id).or_default().value().clone();

        let guard = tokio::time::timeout(self.wait, mutex.lock_owned())
            .await
            .map_err(|_| AppError::unavailable(format!("room {} is busy", room_id)))?;

        Ok(RoomLease {
            room_id,
            inner: LeaseInner::Local(guard),
        })
    }
}
