//! The directory client seam: snapshot types and the async trait.

use async_trait::async_trait;
use serde::Deserialize;

use rosterdb_core::types::DbId;

use crate::events::DirectoryEvent;

/// A community as seen in the live directory: its id plus the ids of its
/// current members.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommunitySnapshot {
    pub community_id: DbId,
    pub member_ids: Vec<DbId>,
}

/// A role within one community.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleEntry {
    pub role_id: DbId,
    /// Whether the role carries the administrator permission.
    pub is_admin: bool,
}

/// Errors from the directory layer.
///
/// A vanished principal is NOT an error: `resolve_display_name` returns
/// `Ok(None)` for that case, since it is an expected, transient outcome
/// that callers log and skip.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The request itself failed (network, DNS, TLS, etc.).
    #[error("directory request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The directory returned a non-2xx status code.
    #[error("directory API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Read-only access to the live membership directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Every community currently visible, with its membership list.
    async fn list_communities(&self) -> Result<Vec<CommunitySnapshot>, DirectoryError>;

    /// Every principal currently reachable through the directory.
    async fn list_known_principals(&self) -> Result<Vec<DbId>, DirectoryError>;

    /// The live display name for a principal, or `None` if the principal
    /// is no longer resolvable (departed or deleted).
    async fn resolve_display_name(&self, user_id: DbId)
        -> Result<Option<String>, DirectoryError>;

    /// The roles defined in one community.
    async fn list_roles(&self, community_id: DbId) -> Result<Vec<RoleEntry>, DirectoryError>;

    /// Wait for the next directory lifecycle event.
    async fn next_event(&self) -> Result<DirectoryEvent, DirectoryError>;
}

/// Collect the admin-capable role ids across every visible community.
///
/// Purely informational at reconcile time (logged so operators can match
/// config rows against live roles); failures per community are skipped.
pub async fn admin_role_ids(
    directory: &dyn DirectoryClient,
    communities: &[CommunitySnapshot],
) -> Vec<DbId> {
    let mut admin_roles = Vec::new();
    for community in communities {
        match directory.list_roles(community.community_id).await {
            Ok(roles) => {
                admin_roles.extend(roles.iter().filter(|r| r.is_admin).map(|r| r.role_id));
            }
            Err(e) => {
                tracing::debug!(
                    community_id = community.community_id,
                    error = %e,
                    "Skipping role listing for community"
                );
            }
        }
    }
    admin_roles
}
