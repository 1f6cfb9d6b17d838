//! In-memory cache of the three entity collections.
//!
//! A single [`CacheStore`] is shared between the foreground event path
//! and the background refresh loop. All state lives behind one mutex, so
//! a wholesale refresh is atomic from a reader's point of view: no reader
//! can observe one collection from a newer refresh than another. The lock
//! is never held across an await point.
//!
//! Every mutation reachable from outside [`CacheStore::refresh`] mirrors
//! a store write that has already succeeded; callers apply the cache
//! mutation only after the store reports success, so cache and store
//! cannot diverge.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use rosterdb_core::types::{DbId, Timestamp};
use rosterdb_db::models::{CommunityConfig, CredentialAccount, DirectoryUser};
use rosterdb_db::repositories::{CommunityConfigRepo, CredentialAccountRepo, DirectoryUserRepo};
use rosterdb_db::{StoreError, StoreGateway};

/// How old a successful refresh may get before the cache counts as stale.
pub const REFRESH_INTERVAL_SECS: i64 = 10;

#[derive(Default)]
struct CacheInner {
    configs: HashMap<DbId, CommunityConfig>,
    users: HashMap<DbId, DirectoryUser>,
    accounts: Vec<CredentialAccount>,
    /// Time of the last successful refresh; `None` until the first one.
    last_refresh: Option<Timestamp>,
}

/// Mutex-guarded owner of the three entity collections.
#[derive(Default)]
pub struct CacheStore {
    inner: Mutex<CacheInner>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // A panic while holding the lock leaves plain data in a sane
        // state; recover the guard rather than poisoning forever.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -- refresh / staleness ------------------------------------------------

    /// Reload all three collections from the store inside one unit of
    /// work, then replace the cached collections wholesale and stamp the
    /// refresh time. On any store error the prior cache state is left
    /// untouched and the error is returned.
    pub async fn refresh(&self, gateway: &StoreGateway) -> Result<(), StoreError> {
        let (configs, users, accounts) = gateway
            .run_unit_of_work(|conn| {
                Box::pin(async move {
                    let configs = CommunityConfigRepo::list(&mut *conn).await?;
                    let users = DirectoryUserRepo::list(&mut *conn).await?;
                    let accounts = CredentialAccountRepo::list(&mut *conn).await?;
                    Ok((configs, users, accounts))
                })
            })
            .await?;

        self.install(configs, users, accounts, Utc::now());
        Ok(())
    }

    /// Replace all three collections and the refresh timestamp in one
    /// critical section. This is [`refresh`](Self::refresh) plumbing,
    /// also used to seed state in tests.
    pub fn install(
        &self,
        configs: Vec<CommunityConfig>,
        users: Vec<DirectoryUser>,
        accounts: Vec<CredentialAccount>,
        now: Timestamp,
    ) {
        let mut inner = self.lock();
        inner.configs = configs.into_iter().map(|c| (c.community_id, c)).collect();
        inner.users = users.into_iter().map(|u| (u.user_id, u)).collect();
        inner.accounts = accounts;
        inner.last_refresh = Some(now);
    }

    /// Whether the cache is due for a reload. True before the first
    /// successful refresh, and once the refresh interval has elapsed.
    pub fn is_stale(&self, now: Timestamp) -> bool {
        match self.lock().last_refresh {
            None => true,
            Some(last) => now - last >= chrono::Duration::seconds(REFRESH_INTERVAL_SECS),
        }
    }

    // -- community configs --------------------------------------------------

    pub fn community_config(&self, community_id: DbId) -> Option<CommunityConfig> {
        self.lock().configs.get(&community_id).cloned()
    }

    pub fn community_ids(&self) -> Vec<DbId> {
        self.lock().configs.keys().copied().collect()
    }

    /// Cache a config whose store insert/update has already succeeded.
    pub fn insert_community_config(&self, config: CommunityConfig) {
        self.lock().configs.insert(config.community_id, config);
    }

    // -- directory users ----------------------------------------------------

    pub fn user(&self, user_id: DbId) -> Option<DirectoryUser> {
        self.lock().users.get(&user_id).cloned()
    }

    pub fn users(&self) -> Vec<DirectoryUser> {
        self.lock().users.values().cloned().collect()
    }

    pub fn user_ids(&self) -> Vec<DbId> {
        self.lock().users.keys().copied().collect()
    }

    /// Cache a user whose store insert has already succeeded.
    pub fn insert_user(&self, user: DirectoryUser) {
        self.lock().users.insert(user.user_id, user);
    }

    /// Apply a display-name update whose store write has already succeeded.
    pub fn set_user_display_name(&self, user_id: DbId, display_name: &str) {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.display_name = display_name.to_string();
        }
    }

    // -- credential accounts ------------------------------------------------

    pub fn accounts(&self) -> Vec<CredentialAccount> {
        self.lock().accounts.clone()
    }

    /// The first still-active credential account owned by this user, if any.
    pub fn first_active_account_for_user(&self, user_id: DbId) -> Option<CredentialAccount> {
        self.lock()
            .accounts
            .iter()
            .find(|a| a.user_id == user_id && a.is_active)
            .cloned()
    }

    /// Cache an account whose provisioning has already succeeded.
    pub fn record_account(&self, account: CredentialAccount) {
        self.lock().accounts.push(account);
    }

    /// Apply a retirement whose store teardown has already succeeded.
    pub fn mark_account_retired(&self, account_id: Uuid, retired_at: Timestamp) {
        if let Some(account) = self
            .lock()
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id)
        {
            account.is_active = false;
            account.retired_at = Some(retired_at);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_state() -> (Vec<CommunityConfig>, Vec<DirectoryUser>, Vec<CredentialAccount>) {
        let configs = vec![CommunityConfig::new_default(42)];
        let users = vec![DirectoryUser::new(7, "bob#1234")];
        let accounts = vec![CredentialAccount {
            id: Uuid::new_v4(),
            community_id: 42,
            user_id: 7,
            account_name: "bob".into(),
            created_at: Utc::now(),
            retired_at: None,
            is_active: true,
        }];
        (configs, users, accounts)
    }

    #[test]
    fn empty_cache_is_stale() {
        let cache = CacheStore::new();
        assert!(cache.is_stale(Utc::now()));
    }

    #[test]
    fn staleness_is_monotonic_over_the_interval() {
        let cache = CacheStore::new();
        let now = Utc::now();
        cache.install(vec![], vec![], vec![], now);

        assert!(!cache.is_stale(now));
        assert!(!cache.is_stale(now + Duration::seconds(REFRESH_INTERVAL_SECS - 1)));
        assert!(cache.is_stale(now + Duration::seconds(REFRESH_INTERVAL_SECS)));
        assert!(cache.is_stale(now + Duration::seconds(REFRESH_INTERVAL_SECS + 1)));
    }

    #[test]
    fn install_replaces_rather_than_appends() {
        let cache = CacheStore::new();
        let (configs, users, accounts) = sample_state();
        cache.install(configs.clone(), users.clone(), accounts.clone(), Utc::now());
        cache.install(configs, users, accounts, Utc::now());

        // Back-to-back identical installs must not duplicate any collection.
        assert_eq!(cache.community_ids().len(), 1);
        assert_eq!(cache.user_ids().len(), 1);
        assert_eq!(cache.accounts().len(), 1);
    }

    #[test]
    fn display_name_update_is_visible() {
        let cache = CacheStore::new();
        let (configs, users, accounts) = sample_state();
        cache.install(configs, users, accounts, Utc::now());

        cache.set_user_display_name(7, "bob#9999");
        assert_eq!(cache.user(7).unwrap().display_name, "bob#9999");
    }

    #[test]
    fn retired_account_no_longer_counts_as_active() {
        let cache = CacheStore::new();
        let (configs, users, accounts) = sample_state();
        let account_id = accounts[0].id;
        cache.install(configs, users, accounts, Utc::now());

        let retired_at = Utc::now();
        cache.mark_account_retired(account_id, retired_at);

        assert!(cache.first_active_account_for_user(7).is_none());
        let account = &cache.accounts()[0];
        assert!(!account.is_active);
        assert_eq!(account.retired_at, Some(retired_at));
    }

    #[test]
    fn first_active_account_skips_retired_entries() {
        let cache = CacheStore::new();
        let (configs, users, mut accounts) = sample_state();
        accounts[0].is_active = false;
        accounts[0].retired_at = Some(Utc::now());
        let second = CredentialAccount {
            id: Uuid::new_v4(),
            community_id: 99,
            user_id: 7,
            account_name: "bob_two".into(),
            created_at: Utc::now(),
            retired_at: None,
            is_active: true,
        };
        accounts.push(second.clone());
        cache.install(configs, users, accounts, Utc::now());

        assert_eq!(cache.first_active_account_for_user(7), Some(second));
    }
}
