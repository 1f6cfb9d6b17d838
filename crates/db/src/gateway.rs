//! One-connection-per-unit-of-work store gateway.
//!
//! Everything above the repository layer interacts with the store through
//! [`StoreGateway::run_unit_of_work`]: one pooled connection is acquired,
//! the work closure runs against it, and the connection is returned to the
//! pool on every exit path (the `PoolConnection` guard drops on success,
//! error, and early return alike). The gateway never retries — callers
//! decide whether and when to try again.

use futures::future::BoxFuture;
use sqlx::postgres::PgConnection;
use sqlx::PgPool;

use crate::error::StoreError;

/// Handle for running units of work against the backing store.
///
/// Cheap to clone; the underlying pool is reference counted.
#[derive(Clone)]
pub struct StoreGateway {
    pool: PgPool,
}

impl StoreGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Acquire one connection, run `work` against it, and release the
    /// connection regardless of outcome.
    ///
    /// Acquisition failure surfaces as [`StoreError::Connection`] and the
    /// work closure is never invoked. Errors from the closure pass through
    /// unchanged.
    pub async fn run_unit_of_work<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, StoreError>> + Send,
        T: Send + 'static,
    {
        let mut conn = self.pool.acquire().await.map_err(StoreError::Connection)?;
        work(&mut *conn).await
        // `conn` drops here and returns to the pool on every path.
    }
}
