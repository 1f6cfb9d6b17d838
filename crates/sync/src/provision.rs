//! Explicit credential provisioning.
//!
//! Accounts are never auto-created by refresh or reconcile; they come
//! from an explicit request on behalf of a (user, community) pair. The
//! cache is updated only after the store reports full success, and the
//! generated password is returned to the requester exactly once.

use rosterdb_core::password::generate_password;
use rosterdb_db::models::{CredentialAccount, ProvisionAccount};
use rosterdb_db::repositories::CredentialAccountRepo;
use rosterdb_db::{StoreError, StoreGateway};

use crate::cache::CacheStore;

/// A freshly provisioned account and its one-time password.
pub struct ProvisionedCredential {
    pub account: CredentialAccount,
    /// Shown to the requester once; never persisted.
    pub password: String,
}

/// Provision a credential account: generate a password, run the
/// store-level creation (name validation, duplicate check, role +
/// grants + bookkeeping insert) in one unit of work, and cache the new
/// record on success. Constraint violations are returned to the caller
/// intact.
pub async fn provision_account(
    cache: &CacheStore,
    gateway: &StoreGateway,
    input: ProvisionAccount,
) -> Result<ProvisionedCredential, StoreError> {
    let password = generate_password();

    let stored_input = input.clone();
    let stored_password = password.clone();
    let account = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                CredentialAccountRepo::provision(conn, &stored_input, &stored_password).await
            })
        })
        .await?;

    tracing::info!(
        user_id = account.user_id,
        community_id = account.community_id,
        account_name = %account.account_name,
        "Provisioned credential account"
    );
    cache.record_account(account.clone());

    Ok(ProvisionedCredential { account, password })
}
