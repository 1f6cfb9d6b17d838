//! Read-only client for the external membership directory.
//!
//! The reconciler and refresh loop consume the directory exclusively
//! through the [`DirectoryClient`] trait, so tests can substitute an
//! in-memory double for the HTTP implementation.

pub mod client;
pub mod events;
pub mod http;

pub use client::{CommunitySnapshot, DirectoryClient, DirectoryError, RoleEntry};
pub use events::DirectoryEvent;
pub use http::HttpDirectoryClient;
