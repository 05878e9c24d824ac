//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use apalis_sql::postgres::PostgresStorage;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{storage_error, AppError, AppResult};
use crate::infra::{
    Cache, ClerkClient, CloudinaryStore, Database, LocalRoomLocks, RedisRoomLocks, RoomLocks,
};
use crate::jobs::{self, PostgresOutbox};
use crate::services::Collaborators;

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    config.server_host = args.host;
    config.server_port = args.port;

    tracing::info!("Starting server...");

    let db = Database::init(&config).await.map_err(storage_error)?;

    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::unavailable(format!("Redis connection failed: {}", e)))?;

    let job_pool = jobs::connect_job_store(&config).await?;

    let locks: Arc<dyn RoomLocks> = if args.local_locks {
        tracing::warn!("Using in-process room locks, run a single instance only");
        Arc::new(LocalRoomLocks::default())
    } else {
        Arc::new(RedisRoomLocks::new(cache.clone()))
    };

    let deps = Collaborators {
        identity: Arc::new(ClerkClient::new(&config.clerk)),
        images: Arc::new(CloudinaryStore::new(config.cloudinary.clone())),
        locks,
        outbox: Arc::new(PostgresOutbox::new(PostgresStorage::new(job_pool.clone()))),
    };

    let app_state = AppState::from_config(db, cache, &config, deps);
    let app = create_router(app_state, &config.cors_origins);

    if args.worker {
        let worker_config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = jobs::run_email_worker(job_pool, &worker_config).await {
                tracing::error!(error = %e, "Email worker exited");
            }
        });
    }

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
