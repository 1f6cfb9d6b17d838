//! Per-community configuration record.

use serde::Serialize;
use sqlx::FromRow;

use rosterdb_core::types::{DbId, UNSET_ID};

/// Configuration row for one external community.
///
/// The four resource ids point at external-directory resources (a status
/// category, a change-log channel, an active-roster channel, and an
/// administrator role). Each is either a valid id or [`UNSET_ID`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CommunityConfig {
    pub community_id: DbId,
    /// Whether members of this community may be issued credential accounts.
    pub access_allowed: bool,
    pub status_category_id: DbId,
    pub changelog_channel_id: DbId,
    pub roster_channel_id: DbId,
    pub admin_role_id: DbId,
}

impl CommunityConfig {
    /// The record created the first time a community is observed with no
    /// existing config: access disallowed, all resource ids unset.
    pub fn new_default(community_id: DbId) -> Self {
        Self {
            community_id,
            access_allowed: false,
            status_category_id: UNSET_ID,
            changelog_channel_id: UNSET_ID,
            roster_channel_id: UNSET_ID,
            admin_role_id: UNSET_ID,
        }
    }

    /// Whether a principal may administer credential accounts in this
    /// community: the configured operator always can; otherwise the
    /// principal must hold this community's admin role.
    ///
    /// The surface that accepts provisioning and retirement requests is
    /// expected to resolve the requester's held roles from the directory
    /// and apply this check before calling into the provisioning path;
    /// nothing below that layer re-checks it.
    pub fn can_administer(&self, principal_id: DbId, operator_id: DbId, held_roles: &[DbId]) -> bool {
        if principal_id == operator_id {
            return true;
        }
        self.admin_role_id != UNSET_ID && held_roles.contains(&self.admin_role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_locked_down() {
        let config = CommunityConfig::new_default(42);
        assert_eq!(config.community_id, 42);
        assert!(!config.access_allowed);
        assert_eq!(config.status_category_id, UNSET_ID);
        assert_eq!(config.changelog_channel_id, UNSET_ID);
        assert_eq!(config.roster_channel_id, UNSET_ID);
        assert_eq!(config.admin_role_id, UNSET_ID);
    }

    #[test]
    fn operator_always_administers() {
        let config = CommunityConfig::new_default(42);
        assert!(config.can_administer(7, 7, &[]));
    }

    #[test]
    fn admin_role_holder_administers() {
        let config = CommunityConfig {
            admin_role_id: 900,
            ..CommunityConfig::new_default(42)
        };
        assert!(config.can_administer(7, 1, &[100, 900]));
        assert!(!config.can_administer(7, 1, &[100]));
    }

    #[test]
    fn unset_admin_role_never_matches() {
        let config = CommunityConfig::new_default(42);
        // Nobody "holds" the -1 sentinel.
        assert!(!config.can_administer(7, 1, &[UNSET_ID]));
    }
}
