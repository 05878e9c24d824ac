//! Notification outbox: durable hand-off from the API to the email worker.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use super::email_job::EmailJob;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Queue of outgoing notifications.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Persist the job for the worker; delivery happens later.
    async fn enqueue_email(&self, job: EmailJob) -> AppResult<()>;
}

/// Outbox stored in the apalis Postgres job tables
#[derive(Clone)]
pub struct PostgresOutbox {
    storage: PostgresStorage<EmailJob>,
}

impl PostgresOutbox {
    pub fn new(storage: PostgresStorage<EmailJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl NotificationQueue for PostgresOutbox {
    async fn enqueue_email(&self, job: EmailJob) -> AppResult<()> {
        let to = job.to.clone();
        let mut storage = self.storage.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::internal(format!("failed to enqueue email: {}", e)))?;

        tracing::debug!(to = %to, "Email job enqueued");
        Ok(())
    }
}
