//! Jobs command - Background job management.
//!
//! Provides CLI commands to manage the email queue:
//! - `work`: Start the email worker process
//! - `list`: Show job counts by status
//! - `clear`: Remove failed jobs from the queue
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- jobs work
//! cargo run -- jobs list
//! cargo run -- jobs clear
//! ```

use apalis_sql::sqlx;

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::jobs;

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    let pool = jobs::connect_job_store(&config).await?;

    match args.action {
        JobsAction::Work => jobs::run_email_worker(pool, &config).await,
        JobsAction::List => list_jobs(&pool).await,
        JobsAction::Clear => clear_failed_jobs(&pool).await,
    }
}

/// Print job counts per status.
async fn list_jobs(pool: &sqlx::PgPool) -> AppResult<()> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status::text, COUNT(*)::bigint FROM apalis.jobs GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    println!("\n=== Job Queue Status ===");
    if rows.is_empty() {
        println!("Queue is empty.");
    }
    for (status, count) in rows {
        println!("{:<9} {}", format!("{}:", status), count);
    }
    println!("========================\n");

    Ok(())
}

async fn clear_failed_jobs(pool: &sqlx::PgPool) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM apalis.jobs WHERE status = 'Failed'")
        .execute(pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to clear jobs: {}", e)))?;

    println!(
        "Cleared {} failed job(s) from the queue.",
        result.rows_affected()
    );
    Ok(())
}
