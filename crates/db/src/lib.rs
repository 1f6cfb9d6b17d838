//! Store access for rosterdb: connection pooling, the unit-of-work
//! gateway, entity models, and their repositories.

use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

pub mod error;
pub mod gateway;
pub mod models;
pub mod repositories;

pub use error::StoreError;
pub use gateway::StoreGateway;

pub type DbPool = sqlx::PgPool;

/// How long to wait for a pooled connection before giving up. Keeps the
/// unit-of-work boundary from blocking indefinitely when the store is
/// unreachable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}

/// Verify the store is reachable and answering queries.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
