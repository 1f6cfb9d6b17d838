//! CRUD coverage for the community-config and directory-user
//! repositories through the gateway.

use sqlx::PgPool;

use rosterdb_core::types::UNSET_ID;
use rosterdb_db::models::{CommunityConfig, DirectoryUser};
use rosterdb_db::repositories::{CommunityConfigRepo, DirectoryUserRepo};
use rosterdb_db::StoreGateway;

#[sqlx::test(migrations = "../../migrations")]
async fn community_config_insert_update_round_trip(pool: PgPool) {
    let gateway = StoreGateway::new(pool);

    let found = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                let config = CommunityConfig::new_default(42);
                CommunityConfigRepo::insert(conn, &config).await?;
                Ok(CommunityConfigRepo::find(conn, 42).await?)
            })
        })
        .await
        .unwrap()
        .expect("inserted config should be findable");

    assert_eq!(found, CommunityConfig::new_default(42));
    assert_eq!(found.admin_role_id, UNSET_ID);

    // Administrative edit: grant access and set the admin role.
    let updated = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                let edited = CommunityConfig {
                    access_allowed: true,
                    admin_role_id: 900,
                    ..CommunityConfig::new_default(42)
                };
                let hit = CommunityConfigRepo::update(conn, &edited).await?;
                assert!(hit, "update should match the existing row");
                Ok(CommunityConfigRepo::find(conn, 42).await?)
            })
        })
        .await
        .unwrap()
        .unwrap();

    assert!(updated.access_allowed);
    assert_eq!(updated.admin_role_id, 900);
    assert_eq!(updated.status_category_id, UNSET_ID);
}

#[sqlx::test(migrations = "../../migrations")]
async fn community_config_update_misses_unknown_id(pool: PgPool) {
    let gateway = StoreGateway::new(pool);

    let hit = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                let config = CommunityConfig::new_default(999);
                Ok(CommunityConfigRepo::update(conn, &config).await?)
            })
        })
        .await
        .unwrap();
    assert!(!hit);
}

#[sqlx::test(migrations = "../../migrations")]
async fn directory_user_name_update_round_trip(pool: PgPool) {
    let gateway = StoreGateway::new(pool);

    let users = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                DirectoryUserRepo::insert(conn, &DirectoryUser::new(7, "bob#1234")).await?;
                DirectoryUserRepo::insert(conn, &DirectoryUser::new(8, "eve#0001")).await?;
                let hit = DirectoryUserRepo::update_display_name(conn, 7, "bob#9999").await?;
                assert!(hit);
                Ok(DirectoryUserRepo::list(conn).await?)
            })
        })
        .await
        .unwrap();

    assert_eq!(
        users,
        vec![
            DirectoryUser::new(7, "bob#9999"),
            DirectoryUser::new(8, "eve#0001"),
        ]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_directory_user_insert_is_a_store_error(pool: PgPool) {
    let gateway = StoreGateway::new(pool);

    let result = gateway
        .run_unit_of_work(move |conn| {
            Box::pin(async move {
                DirectoryUserRepo::insert(conn, &DirectoryUser::new(7, "bob#1234")).await?;
                DirectoryUserRepo::insert(conn, &DirectoryUser::new(7, "bob#1234")).await?;
                Ok(())
            })
        })
        .await;

    assert!(result.is_err(), "primary key violation should surface");
}
