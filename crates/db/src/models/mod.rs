//! Entity models for the three bookkeeping tables.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus any create DTOs the provisioning path needs.
//! Entities never reference each other directly; relationships are
//! expressed by identifier and resolved by cache lookup.

pub mod community_config;
pub mod credential_account;
pub mod directory_user;

pub use community_config::CommunityConfig;
pub use credential_account::{CredentialAccount, ProvisionAccount};
pub use directory_user::DirectoryUser;
