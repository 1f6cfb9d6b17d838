//! Cached external-directory principal.

use serde::Serialize;
use sqlx::FromRow;

use rosterdb_core::types::DbId;

/// One row per directory principal known to the system. The display name
/// is a cache of the live directory name, kept to make manual store
/// inspection readable; it may lag the live value between refresh passes.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct DirectoryUser {
    pub user_id: DbId,
    pub display_name: String,
}

impl DirectoryUser {
    pub fn new(user_id: DbId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}
