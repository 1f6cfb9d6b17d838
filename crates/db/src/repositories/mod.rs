//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&mut PgConnection` as the first argument, so every call runs
//! on the single connection of the gateway's current unit of work.

pub mod community_config_repo;
pub mod credential_account_repo;
pub mod directory_user_repo;

pub use community_config_repo::CommunityConfigRepo;
pub use credential_account_repo::CredentialAccountRepo;
pub use directory_user_repo::DirectoryUserRepo;
