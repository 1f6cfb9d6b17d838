//! The cache/reconciliation engine.
//!
//! [`cache::CacheStore`] holds the three entity collections behind one
//! mutex and owns the TTL policy. [`reconcile`] aligns the cache and the
//! store with the live directory snapshot. [`refresh`] is the background
//! loop that keeps the cache within its staleness window, and
//! [`provision`] is the explicit credential-creation path.

pub mod cache;
pub mod provision;
pub mod reconcile;
pub mod refresh;

pub use cache::CacheStore;
pub use provision::{provision_account, ProvisionedCredential};
pub use reconcile::{reconcile, ReconcileReport};
