//! Repository for credential accounts: bookkeeping rows plus the
//! store-level role lifecycle (create/grant on provision, revoke/drop on
//! retirement).
//!
//! Role names cannot be bound as statement parameters in DDL, so they are
//! quoted and interpolated. Names are validated against a conservative
//! identifier charset before any statement is built.

use sqlx::{Connection, PgConnection};
use uuid::Uuid;

use rosterdb_core::naming::validate_account_name;
use rosterdb_core::types::Timestamp;

use crate::error::StoreError;
use crate::models::credential_account::{CredentialAccount, ProvisionAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, community_id, user_id, account_name, created_at, retired_at, is_active";

/// Provides persistence and lifecycle operations for credential accounts.
pub struct CredentialAccountRepo;

impl CredentialAccountRepo {
    /// Bulk read of every credential account row, newest first.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<CredentialAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM credential_accounts ORDER BY created_at DESC");
        sqlx::query_as::<_, CredentialAccount>(&query)
            .fetch_all(conn)
            .await
    }

    /// Whether a login role with this name exists at the store level.
    pub async fn role_exists(conn: &mut PgConnection, name: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM pg_catalog.pg_roles WHERE rolname = $1")
                .bind(name)
                .fetch_optional(conn)
                .await?;
        Ok(row.is_some())
    }

    /// Provision a new credential account.
    ///
    /// Validates the name (before any store call), rejects duplicates at
    /// the store level, then creates the login role, grants it read access
    /// to the application tables, and inserts the bookkeeping row. The
    /// creation timestamp is stamped by the final insert, so it only
    /// exists once every prior step has succeeded.
    ///
    /// The password is used for the role DDL and never persisted.
    pub async fn provision(
        conn: &mut PgConnection,
        input: &ProvisionAccount,
        password: &str,
    ) -> Result<CredentialAccount, StoreError> {
        validate_account_name(&input.account_name)?;

        // Role DDL is transactional in Postgres, so the role, its grants,
        // and the bookkeeping row either all exist afterwards or none do.
        let mut tx = conn.begin().await?;

        if Self::role_exists(&mut *tx, &input.account_name).await? {
            return Err(StoreError::AccountExists {
                name: input.account_name.clone(),
            });
        }

        let role = quote_ident(&input.account_name);
        sqlx::query(&format!(
            "CREATE ROLE {role} LOGIN PASSWORD {}",
            quote_literal(password)
        ))
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "GRANT SELECT ON ALL TABLES IN SCHEMA public TO {role}"
        ))
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO credential_accounts (id, community_id, user_id, account_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let account = sqlx::query_as::<_, CredentialAccount>(&query)
            .bind(Uuid::new_v4())
            .bind(input.community_id)
            .bind(input.user_id)
            .bind(&input.account_name)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(account)
    }

    /// Retire a credential account: revoke its grants, drop the store-level
    /// role, and mark the bookkeeping row inactive, all in one transaction.
    /// The retirement timestamp is stamped by the final update, so it only
    /// exists once the teardown has succeeded in full; if the bookkeeping
    /// row is missing the whole teardown rolls back and the role survives.
    pub async fn retire(
        conn: &mut PgConnection,
        account_id: Uuid,
        account_name: &str,
    ) -> Result<Timestamp, StoreError> {
        let mut tx = conn.begin().await?;

        if !Self::role_exists(&mut *tx, account_name).await? {
            return Err(StoreError::AccountMissing {
                name: account_name.to_string(),
            });
        }

        let role = quote_ident(account_name);
        sqlx::query(&format!(
            "REVOKE ALL ON ALL TABLES IN SCHEMA public FROM {role}"
        ))
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!("DROP ROLE {role}"))
            .execute(&mut *tx)
            .await?;

        let row: Option<(Timestamp,)> = sqlx::query_as(
            "UPDATE credential_accounts
             SET is_active = FALSE, retired_at = NOW()
             WHERE id = $1 AND is_active = TRUE
             RETURNING retired_at",
        )
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some((retired_at,)) => {
                tx.commit().await?;
                Ok(retired_at)
            }
            None => Err(StoreError::AccountMissing {
                name: account_name.to_string(),
            }),
        }
    }
}

/// Quote a role name for interpolation into DDL.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for interpolation into DDL.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_ident_wraps_and_escapes() {
        assert_eq!(quote_ident("bob"), "\"bob\"");
        assert_eq!(quote_ident("bo\"b"), "\"bo\"\"b\"");
    }

    #[test]
    fn quote_literal_wraps_and_escapes() {
        assert_eq!(quote_literal("pw"), "'pw'");
        assert_eq!(quote_literal("p'w"), "'p''w'");
    }
}
