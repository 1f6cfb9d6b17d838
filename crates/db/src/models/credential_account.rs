//! Provisioned store-credential bookkeeping record.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use rosterdb_core::types::{DbId, Timestamp};

/// One row per provisioned store login, scoped to a (user, community)
/// pair. The password is never stored; only the account name and
/// lifecycle timestamps are.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CredentialAccount {
    pub id: Uuid,
    pub community_id: DbId,
    pub user_id: DbId,
    pub account_name: String,
    /// Stamped when provisioning completed in full.
    pub created_at: Timestamp,
    /// Stamped when retirement completed in full; `None` while active.
    pub retired_at: Option<Timestamp>,
    pub is_active: bool,
}

/// Input for an explicit provisioning request.
#[derive(Debug, Clone)]
pub struct ProvisionAccount {
    pub community_id: DbId,
    pub user_id: DbId,
    pub account_name: String,
}
