//! Repository for the `community_configs` table.

use sqlx::PgConnection;

use rosterdb_core::types::DbId;

use crate::models::community_config::CommunityConfig;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "community_id, access_allowed, status_category_id, \
                       changelog_channel_id, roster_channel_id, admin_role_id";

/// Provides persistence operations for community configs.
pub struct CommunityConfigRepo;

impl CommunityConfigRepo {
    /// Bulk read of every community config, in id order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<CommunityConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM community_configs ORDER BY community_id");
        sqlx::query_as::<_, CommunityConfig>(&query)
            .fetch_all(conn)
            .await
    }

    /// Find one community config by its community id.
    pub async fn find(
        conn: &mut PgConnection,
        community_id: DbId,
    ) -> Result<Option<CommunityConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM community_configs WHERE community_id = $1");
        sqlx::query_as::<_, CommunityConfig>(&query)
            .bind(community_id)
            .fetch_optional(conn)
            .await
    }

    /// Insert a new community config row.
    pub async fn insert(
        conn: &mut PgConnection,
        config: &CommunityConfig,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO community_configs
                (community_id, access_allowed, status_category_id,
                 changelog_channel_id, roster_channel_id, admin_role_id)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(config.community_id)
        .bind(config.access_allowed)
        .bind(config.status_category_id)
        .bind(config.changelog_channel_id)
        .bind(config.roster_channel_id)
        .bind(config.admin_role_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Persist every mutable field of a modified config.
    ///
    /// Returns `false` if no row with that community id exists.
    pub async fn update(
        conn: &mut PgConnection,
        config: &CommunityConfig,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE community_configs SET
                access_allowed = $2,
                status_category_id = $3,
                changelog_channel_id = $4,
                roster_channel_id = $5,
                admin_role_id = $6
             WHERE community_id = $1",
        )
        .bind(config.community_id)
        .bind(config.access_allowed)
        .bind(config.status_category_id)
        .bind(config.changelog_channel_id)
        .bind(config.roster_channel_id)
        .bind(config.admin_role_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
