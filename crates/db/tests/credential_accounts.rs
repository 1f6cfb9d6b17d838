//! Credential account lifecycle against a real store.
//!
//! Role names are uniquified per test because login roles are
//! cluster-global, unlike the per-test database sqlx provisions.

use assert_matches::assert_matches;
use sqlx::PgPool;
use uuid::Uuid;

use rosterdb_core::naming::NameError;
use rosterdb_db::models::ProvisionAccount;
use rosterdb_db::repositories::CredentialAccountRepo;
use rosterdb_db::{StoreError, StoreGateway};

fn unique_name(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..12])
}

fn provision_input(name: &str) -> ProvisionAccount {
    ProvisionAccount {
        community_id: 42,
        user_id: 7,
        account_name: name.to_string(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn provision_then_retire_round_trip(pool: PgPool) {
    let gateway = StoreGateway::new(pool);
    let name = unique_name("bob");

    let input = provision_input(&name);
    let account = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::provision(conn, &input, "hunter2hunter22").await })
        })
        .await
        .expect("provisioning should succeed");

    assert_eq!(account.account_name, name);
    assert!(account.is_active);
    assert!(account.retired_at.is_none());

    let check_name = name.clone();
    let exists = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                Ok(CredentialAccountRepo::role_exists(conn, &check_name).await?)
            })
        })
        .await
        .unwrap();
    assert!(exists, "login role should exist after provisioning");

    let retire_name = name.clone();
    let retired_at = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::retire(conn, account.id, &retire_name).await })
        })
        .await
        .expect("retirement should succeed");
    assert!(retired_at <= chrono::Utc::now());

    let check_name = name.clone();
    let exists = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                Ok(CredentialAccountRepo::role_exists(conn, &check_name).await?)
            })
        })
        .await
        .unwrap();
    assert!(!exists, "login role should be dropped after retirement");
}

#[sqlx::test(migrations = "../../migrations")]
async fn reserved_name_is_rejected_before_any_store_call(pool: PgPool) {
    let gateway = StoreGateway::new(pool);

    let input = provision_input("admin");
    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::provision(conn, &input, "pw_irrelevant00").await })
        })
        .await;

    assert_matches!(result, Err(StoreError::Name(NameError::Reserved(_))));

    // No bookkeeping row may exist for the rejected name.
    let rows = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { Ok(CredentialAccountRepo::list(conn).await?) })
        })
        .await
        .unwrap();
    assert!(rows.iter().all(|a| a.account_name != "admin"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_provisioning_is_rejected(pool: PgPool) {
    let gateway = StoreGateway::new(pool);
    let name = unique_name("dup");

    let first = provision_input(&name);
    let account = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::provision(conn, &first, "firstpassword1").await })
        })
        .await
        .expect("first provisioning should succeed");

    let second = provision_input(&name);
    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::provision(conn, &second, "secondpassword2").await })
        })
        .await;
    assert_matches!(result, Err(StoreError::AccountExists { .. }));
    assert!(result.unwrap_err().is_constraint());

    // Cleanup: drop the cluster-global role.
    let retire_name = name.clone();
    gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::retire(conn, account.id, &retire_name).await })
        })
        .await
        .expect("cleanup retirement should succeed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_retirement_rolls_back_and_keeps_the_role(pool: PgPool) {
    let gateway = StoreGateway::new(pool);
    let name = unique_name("keep");

    let input = provision_input(&name);
    let account = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::provision(conn, &input, "rollbackproof1").await })
        })
        .await
        .expect("provisioning should succeed");

    // Wrong bookkeeping id: the role exists, so the teardown proceeds past
    // REVOKE and DROP ROLE before the update misses. The whole transaction
    // must roll back, leaving the login role in place.
    let wrong_id_name = name.clone();
    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                CredentialAccountRepo::retire(conn, Uuid::new_v4(), &wrong_id_name).await
            })
        })
        .await;
    assert_matches!(result, Err(StoreError::AccountMissing { .. }));

    let check_name = name.clone();
    let exists = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                Ok(CredentialAccountRepo::role_exists(conn, &check_name).await?)
            })
        })
        .await
        .unwrap();
    assert!(exists, "login role should survive a failed retirement");

    // Cleanup: a correct retirement still goes through.
    let retire_name = name.clone();
    gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move { CredentialAccountRepo::retire(conn, account.id, &retire_name).await })
        })
        .await
        .expect("cleanup retirement should succeed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn retiring_a_nonexistent_account_is_rejected(pool: PgPool) {
    let gateway = StoreGateway::new(pool);
    let name = unique_name("ghost");

    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                CredentialAccountRepo::retire(conn, Uuid::new_v4(), &name).await
            })
        })
        .await;

    assert_matches!(result, Err(StoreError::AccountMissing { .. }));
}
