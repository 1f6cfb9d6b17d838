//! Repository for the `directory_users` table.

use sqlx::PgConnection;

use rosterdb_core::types::DbId;

use crate::models::directory_user::DirectoryUser;

/// Provides persistence operations for directory users.
pub struct DirectoryUserRepo;

impl DirectoryUserRepo {
    /// Bulk read of every known directory user, in id order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<DirectoryUser>, sqlx::Error> {
        sqlx::query_as::<_, DirectoryUser>(
            "SELECT user_id, display_name FROM directory_users ORDER BY user_id",
        )
        .fetch_all(conn)
        .await
    }

    /// Insert a newly observed directory user.
    pub async fn insert(conn: &mut PgConnection, user: &DirectoryUser) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO directory_users (user_id, display_name) VALUES ($1, $2)")
            .bind(user.user_id)
            .bind(&user.display_name)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Persist a refreshed display name.
    ///
    /// Returns `false` if no row with that user id exists.
    pub async fn update_display_name(
        conn: &mut PgConnection,
        user_id: DbId,
        display_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE directory_users SET display_name = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(display_name)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
