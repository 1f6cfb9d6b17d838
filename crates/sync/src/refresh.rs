//! Background cache refresh loop.
//!
//! A single task polls the cache's staleness flag roughly once a second.
//! When the cache is stale it reloads all three collections from the
//! store; on success it re-derives every cached display name from the
//! live directory in a fresh unit of work. A failed refresh is logged
//! and retried on the next staleness window; there is no back-off.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use rosterdb_core::types::DbId;
use rosterdb_db::repositories::DirectoryUserRepo;
use rosterdb_db::StoreGateway;
use rosterdb_directory::DirectoryClient;

use crate::cache::CacheStore;

/// How often the loop checks the staleness flag.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Run the refresh loop until `cancel` is triggered.
pub async fn run(
    cache: Arc<CacheStore>,
    gateway: StoreGateway,
    directory: Arc<dyn DirectoryClient>,
    cancel: CancellationToken,
) {
    tracing::info!(
        tick_secs = TICK_INTERVAL.as_secs(),
        refresh_interval_secs = crate::cache::REFRESH_INTERVAL_SECS,
        "Cache refresh loop started"
    );

    let mut interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache refresh loop stopping");
                break;
            }
            _ = interval.tick() => {
                if !cache.is_stale(Utc::now()) {
                    continue;
                }
                match cache.refresh(&gateway).await {
                    Ok(()) => {
                        tracing::debug!("Cache refreshed from store");
                        refresh_display_names(directory.as_ref(), &cache, &gateway).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Cache refresh failed; will retry on next staleness window");
                    }
                }
            }
        }
    }
}

/// Re-derive every cached user's display name from the live directory and
/// persist the ones that changed inside one unit of work. Lookup misses
/// and failures are skipped silently (logged at debug), leaving the
/// cached name in place.
pub async fn refresh_display_names(
    directory: &dyn DirectoryClient,
    cache: &CacheStore,
    gateway: &StoreGateway,
) {
    let mut changed: Vec<(DbId, String)> = Vec::new();
    for user in cache.users() {
        match directory.resolve_display_name(user.user_id).await {
            Ok(Some(name)) if name != user.display_name => changed.push((user.user_id, name)),
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(
                    user_id = user.user_id,
                    "Display name lookup missed; keeping cached value"
                );
            }
            Err(e) => {
                tracing::debug!(
                    user_id = user.user_id,
                    error = %e,
                    "Display name lookup failed; keeping cached value"
                );
            }
        }
    }

    if changed.is_empty() {
        return;
    }

    let updates = changed.clone();
    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                for (user_id, name) in &updates {
                    DirectoryUserRepo::update_display_name(&mut *conn, *user_id, name).await?;
                }
                Ok(())
            })
        })
        .await;

    match result {
        Ok(()) => {
            let updated = changed.len();
            for (user_id, name) in changed {
                cache.set_user_display_name(user_id, &name);
            }
            tracing::info!(updated, "Display name cache refreshed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Display name refresh pass failed; cached values kept");
        }
    }
}
