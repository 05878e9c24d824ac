//! Migrate command - Database migration management.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{storage_error, AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // manual control: no automatic migrations on connect
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(storage_error)?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(storage_error)?;
            tracing::info!("Migrations completed");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(storage_error)?;
            tracing::info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(storage_error)?;
            let pending = status.iter().filter(|(_, applied)| !applied).count();
            for (name, applied) in &status {
                println!("{:<50} {}", name, if *applied { "applied" } else { "pending" });
            }
            println!("{} migration(s), {} pending", status.len(), pending);
        }
        MigrateAction::Fresh { yes } => {
            if !yes {
                return Err(AppError::validation(
                    "fresh drops every table, pass --yes to confirm",
                ));
            }
            tracing::warn!("Dropping all tables and re-running migrations");
            db.fresh_migrations().await.map_err(storage_error)?;
            tracing::info!("Fresh migrations completed");
        }
    }

    Ok(())
}
