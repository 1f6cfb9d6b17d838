use rosterdb_core::naming::NameError;

/// Errors raised at the store boundary.
///
/// `Connection` is distinct from `Query` so callers can tell "the store is
/// unreachable, keep serving stale cache" apart from "this particular unit
/// of work failed". The constraint variants are raised by provisioning and
/// retirement and are returned to their caller intact, never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A connection could not be acquired (store unreachable, bad
    /// credentials, pool exhausted past the acquire timeout).
    #[error("could not open a store connection: {0}")]
    Connection(#[source] sqlx::Error),

    /// A query inside an already-acquired unit of work failed.
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// Provisioning was asked to create an account that already exists
    /// at the store level.
    #[error("credential account {name:?} already exists at the store level")]
    AccountExists { name: String },

    /// Retirement was asked to tear down an account that does not exist
    /// at the store level.
    #[error("credential account {name:?} does not exist at the store level")]
    AccountMissing { name: String },

    /// The requested account name failed validation before any store call.
    #[error(transparent)]
    Name(#[from] NameError),
}

impl StoreError {
    /// True for the constraint-violation variants (duplicate creation,
    /// retirement of a nonexistent account, rejected name).
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            StoreError::AccountExists { .. }
                | StoreError::AccountMissing { .. }
                | StoreError::Name(_)
        )
    }
}
