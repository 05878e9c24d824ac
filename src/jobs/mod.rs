//! Background jobs.
//!
//! The API enqueues email jobs into apalis' Postgres storage; a worker
//! (`jobs work`, or `serve --worker`) delivers them with retries.

pub mod email_job;
pub mod outbox;

use std::sync::Arc;

use apalis::layers::retry::RetryPolicy;
use apalis::layers::WorkerBuilderExt;
use apalis::prelude::*;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::{Config, EMAIL_JOB_MAX_RETRIES, JOB_WORKER_EMAIL};
use crate::errors::{AppError, AppResult};

pub use email_job::{email_job_handler, EmailJob, Mailer};
pub use outbox::{NotificationQueue, PostgresOutbox};

#[cfg(any(test, feature = "test-utils"))]
pub use outbox::MockNotificationQueue;

/// Connect the job store pool and create apalis' tables if needed.
pub async fn connect_job_store(config: &Config) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.db_connect_timeout)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::unavailable(format!("job store connection: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(pool)
}

/// Run the email worker until the monitor stops or Ctrl+C is received.
pub async fn run_email_worker(pool: PgPool, config: &Config) -> AppResult<()> {
    let storage: PostgresStorage<EmailJob> = PostgresStorage::new(pool);
    let mailer = Arc::new(Mailer::from_config(&config.smtp)?);

    let worker = WorkerBuilder::new(JOB_WORKER_EMAIL)
        .data(mailer)
        .retry(RetryPolicy::retries(EMAIL_JOB_MAX_RETRIES))
        .backend(storage)
        .build_fn(email_job_handler);

    tracing::info!(worker = JOB_WORKER_EMAIL, "Job worker started");

    Monitor::new()
        .register(worker)
        .run_with_signal(tokio::signal::ctrl_c())
        .await
        .map_err(|e| AppError::internal(format!("Worker failed: {}", e)))?;

    tracing::info!("Job worker stopped");
    Ok(())
}
