use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rosterdb_db::StoreGateway;
use rosterdb_directory::{DirectoryClient, DirectoryEvent, HttpDirectoryClient};
use rosterdb_sync::{reconcile, refresh, CacheStore};

mod config;

use config::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rosterdb_worker=debug,rosterdb_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match WorkerConfig::load(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid startup configuration");
            std::process::exit(2);
        }
    };

    let pool = match rosterdb_db::create_pool(&config.database_url()).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Could not connect to the store");
            std::process::exit(1);
        }
    };
    if let Err(e) = rosterdb_db::health_check(&pool).await {
        tracing::error!(error = %e, "Store health check failed");
        std::process::exit(1);
    }
    if let Err(e) = rosterdb_db::run_migrations(&pool).await {
        tracing::error!(error = %e, "Could not apply store migrations");
        std::process::exit(1);
    }
    tracing::info!("Store ready");

    let gateway = StoreGateway::new(pool);
    let cache = Arc::new(CacheStore::new());

    // Prime the cache at boot. Failure is not fatal: the refresh loop
    // retries and the service runs on an empty cache until then.
    if let Err(e) = cache.refresh(&gateway).await {
        tracing::warn!(error = %e, "Initial cache refresh failed; starting empty");
    }

    let directory: Arc<dyn DirectoryClient> = Arc::new(HttpDirectoryClient::new(
        config.directory_url.clone(),
        config.directory_token.clone(),
    ));

    let cancel = CancellationToken::new();
    let refresh_task = tokio::spawn(refresh::run(
        cache.clone(),
        gateway.clone(),
        directory.clone(),
        cancel.clone(),
    ));

    if config.operator_id == rosterdb_core::types::UNSET_ID {
        tracing::warn!("No operator principal configured; only community admin roles can administer accounts");
    } else {
        tracing::info!(operator_id = config.operator_id, "Operator principal configured");
    }

    tracing::info!(directory_url = %config.directory_url, "Listening for directory events");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            event = directory.next_event() => match event {
                Ok(DirectoryEvent::Ready) => {
                    tracing::info!("Directory ready; reconciling");
                    if let Err(e) = reconcile(directory.as_ref(), &cache, &gateway).await {
                        tracing::warn!(error = %e, "Reconcile pass could not fetch the directory snapshot");
                    }
                }
                Ok(DirectoryEvent::Resumed) => {
                    tracing::info!("Directory connection resumed; reconciling");
                    if let Err(e) = reconcile(directory.as_ref(), &cache, &gateway).await {
                        tracing::warn!(error = %e, "Reconcile pass could not fetch the directory snapshot");
                    }
                }
                Ok(DirectoryEvent::Closed { reason }) => {
                    tracing::warn!(?reason, "Directory closed the connection");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Directory event stream error");
                    // Do not hot-loop while the directory is unreachable.
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
            }
        }
    }

    cancel.cancel();
    if let Err(e) = refresh_task.await {
        tracing::error!(error = %e, "Refresh task panicked");
    }
    tracing::info!("Worker stopped");
}
