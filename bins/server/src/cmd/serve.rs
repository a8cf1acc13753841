use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{Effective, ServeArgs};
use crate::error::ServerError;
use dbapi_api::RoutineExecutor;
use dbapi_postgres::PgExecutor;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("dbapi-server starting");

    // --- Load config ---
    let config = Effective::new(&args)?;
    tracing::info!(config = args.config_path(), host = %config.host, port = config.port, "loaded config");

    // --- Connectivity check ---
    let executor = PgExecutor::from_conn_str(&config.postgres)?;
    let version = executor.version().await.map_err(|e| e.with_context("connectivity check"))?;
    tracing::info!(%version, "connected to postgres");

    let executor: Arc<dyn RoutineExecutor> = Arc::new(executor);

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- API server ---
    let api_token = token.clone();
    let mut api_handle = tokio::spawn(async move {
        dbapi_api_server::run(&config.host, config.port, executor, api_token).await
    });

    tracing::info!("server ready");

    // --- Wait for Ctrl+C, or the server failing on its own ---
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutting down...");
        }
        result = &mut api_handle => {
            // Only returns before shutdown on failure.
            result??;
            return Ok(());
        }
    }

    // Signal the server to stop accepting and drain in-flight requests
    token.cancel();

    // Drain: wait up to 5s, then abort
    match tokio::time::timeout(Duration::from_secs(5), &mut api_handle).await {
        Ok(result) => result??,
        Err(_) => {
            tracing::warn!("api server did not stop in time, aborting");
            api_handle.abort();
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}
