//! Reconciliation of the cache and store against the live directory.
//!
//! Runs when the directory becomes reachable and opportunistically
//! thereafter; re-entrant with respect to already-reconciled state.
//! Each entity's store interaction is its own unit of work, so a failure
//! for one community or principal never aborts the rest of the pass.

use std::collections::HashSet;

use rosterdb_core::types::DbId;
use rosterdb_db::models::{CommunityConfig, DirectoryUser};
use rosterdb_db::repositories::{CommunityConfigRepo, CredentialAccountRepo, DirectoryUserRepo};
use rosterdb_db::StoreGateway;
use rosterdb_directory::client::admin_role_ids;
use rosterdb_directory::{CommunitySnapshot, DirectoryClient, DirectoryError};

use crate::cache::CacheStore;

/// What one reconcile pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub configs_created: usize,
    pub users_created: usize,
    pub names_refreshed: usize,
    pub accounts_retired: usize,
    /// Store steps that failed and were skipped; the pass continued.
    pub failed_steps: usize,
}

/// Run one full reconcile pass over the directory's current snapshot.
///
/// Returns `Err` only if the snapshot itself cannot be fetched; store
/// errors for individual entities are logged, counted in
/// [`ReconcileReport::failed_steps`], and do not abort the pass.
pub async fn reconcile(
    directory: &dyn DirectoryClient,
    cache: &CacheStore,
    gateway: &StoreGateway,
) -> Result<ReconcileReport, DirectoryError> {
    let mut report = ReconcileReport::default();

    // Pass 1: communities with no config record yet.
    let communities = directory.list_communities().await?;
    let admin_roles = admin_role_ids(directory, &communities).await;
    tracing::debug!(
        communities = communities.len(),
        admin_roles = admin_roles.len(),
        "Directory snapshot fetched"
    );

    for community_id in missing_community_ids(&communities, &cache.community_ids()) {
        let config = CommunityConfig::new_default(community_id);
        let inserted = config.clone();
        let result = gateway
            .run_unit_of_work(move |conn| {
                Box::pin(async move {
                    CommunityConfigRepo::insert(conn, &inserted).await?;
                    Ok(())
                })
            })
            .await;
        match result {
            Ok(()) => {
                cache.insert_community_config(config);
                report.configs_created += 1;
                tracing::info!(community_id, "Created default community config");
            }
            Err(e) => {
                report.failed_steps += 1;
                tracing::error!(community_id, error = %e, "Could not insert community config");
            }
        }
    }

    // Pass 2: refresh cached principals' names, insert unknown principals.
    let principals = directory.list_known_principals().await?;
    let live: HashSet<DbId> = principals.iter().copied().collect();

    for &user_id in &principals {
        match cache.user(user_id) {
            Some(cached) => {
                refresh_one_display_name(directory, cache, gateway, &cached, &mut report).await;
            }
            None => {
                insert_new_user(directory, cache, gateway, user_id, &mut report).await;
            }
        }
    }

    // Pass 3: retire credential accounts of departed principals.
    for user_id in departed_user_ids(&cache.user_ids(), &live) {
        let Some(account) = cache.first_active_account_for_user(user_id) else {
            continue;
        };
        let account_id = account.id;
        let account_name = account.account_name.clone();
        let result = gateway
            .run_unit_of_work(move |conn| {
                Box::pin(
                    async move { CredentialAccountRepo::retire(conn, account_id, &account_name).await },
                )
            })
            .await;
        match result {
            Ok(retired_at) => {
                cache.mark_account_retired(account.id, retired_at);
                report.accounts_retired += 1;
                tracing::info!(
                    user_id,
                    account_name = %account.account_name,
                    "Retired credential account of departed principal"
                );
            }
            Err(e) => {
                report.failed_steps += 1;
                tracing::error!(
                    user_id,
                    account_name = %account.account_name,
                    error = %e,
                    "Could not retire credential account"
                );
            }
        }
    }

    tracing::info!(
        configs_created = report.configs_created,
        users_created = report.users_created,
        names_refreshed = report.names_refreshed,
        accounts_retired = report.accounts_retired,
        failed_steps = report.failed_steps,
        "Reconcile pass complete"
    );
    Ok(report)
}

/// Look up a cached principal's live name and persist it if it changed.
/// A lookup miss leaves the cached name untouched; that is a missed
/// update, not an error.
async fn refresh_one_display_name(
    directory: &dyn DirectoryClient,
    cache: &CacheStore,
    gateway: &StoreGateway,
    cached: &DirectoryUser,
    report: &mut ReconcileReport,
) {
    let user_id = cached.user_id;
    let live_name = match directory.resolve_display_name(user_id).await {
        Ok(Some(name)) => name,
        Ok(None) => {
            tracing::debug!(user_id, "Display name lookup missed; keeping cached value");
            return;
        }
        Err(e) => {
            tracing::debug!(user_id, error = %e, "Display name lookup failed; keeping cached value");
            return;
        }
    };
    if live_name == cached.display_name {
        return;
    }

    let name_for_store = live_name.clone();
    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                DirectoryUserRepo::update_display_name(conn, user_id, &name_for_store).await?;
                Ok(())
            })
        })
        .await;
    match result {
        Ok(()) => {
            cache.set_user_display_name(user_id, &live_name);
            report.names_refreshed += 1;
        }
        Err(e) => {
            report.failed_steps += 1;
            tracing::error!(user_id, error = %e, "Could not persist refreshed display name");
        }
    }
}

/// Insert a directory user observed for the first time. Skipped (and
/// retried on the next pass) if the live name cannot be resolved.
async fn insert_new_user(
    directory: &dyn DirectoryClient,
    cache: &CacheStore,
    gateway: &StoreGateway,
    user_id: DbId,
    report: &mut ReconcileReport,
) {
    let name = match directory.resolve_display_name(user_id).await {
        Ok(Some(name)) => name,
        Ok(None) => {
            tracing::debug!(user_id, "New principal vanished before its name resolved; skipping");
            return;
        }
        Err(e) => {
            tracing::debug!(user_id, error = %e, "Could not resolve new principal's name; skipping");
            return;
        }
    };

    let user = DirectoryUser::new(user_id, name);
    let inserted = user.clone();
    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                DirectoryUserRepo::insert(conn, &inserted).await?;
                Ok(())
            })
        })
        .await;
    match result {
        Ok(()) => {
            cache.insert_user(user);
            report.users_created += 1;
            tracing::info!(user_id, "Recorded new directory user");
        }
        Err(e) => {
            report.failed_steps += 1;
            tracing::error!(user_id, error = %e, "Could not insert directory user");
        }
    }
}

/// Community ids visible in the snapshot but absent from the cache.
pub fn missing_community_ids(snapshot: &[CommunitySnapshot], cached: &[DbId]) -> Vec<DbId> {
    let cached: HashSet<DbId> = cached.iter().copied().collect();
    snapshot
        .iter()
        .map(|c| c.community_id)
        .filter(|id| !cached.contains(id))
        .collect()
}

/// Cached user ids no longer resolvable in the live principal set.
pub fn departed_user_ids(cached: &[DbId], live: &HashSet<DbId>) -> Vec<DbId> {
    cached.iter().copied().filter(|id| !live.contains(id)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(community_id: DbId, member_ids: &[DbId]) -> CommunitySnapshot {
        CommunitySnapshot {
            community_id,
            member_ids: member_ids.to_vec(),
        }
    }

    #[test]
    fn missing_communities_against_empty_cache() {
        let snapshots = vec![snapshot(42, &[7])];
        assert_eq!(missing_community_ids(&snapshots, &[]), vec![42]);
    }

    #[test]
    fn cached_communities_are_not_missing() {
        let snapshots = vec![snapshot(42, &[7]), snapshot(43, &[8])];
        assert_eq!(missing_community_ids(&snapshots, &[42]), vec![43]);
    }

    #[test]
    fn no_departures_when_everyone_is_live() {
        let live: HashSet<DbId> = [7, 8].into_iter().collect();
        assert!(departed_user_ids(&[7, 8], &live).is_empty());
    }

    #[test]
    fn departed_users_are_cached_minus_live() {
        let live: HashSet<DbId> = [8].into_iter().collect();
        assert_eq!(departed_user_ids(&[7, 8], &live), vec![7]);
    }

    #[test]
    fn unknown_live_principals_are_not_departures() {
        // A principal in the live set but not cached is pass 2's concern.
        let live: HashSet<DbId> = [7, 9].into_iter().collect();
        assert!(departed_user_ids(&[7], &live).is_empty());
    }
}
