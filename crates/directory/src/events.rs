//! Lifecycle events emitted by the directory connection.
//!
//! A closed set of variants; consumers dispatch with a single `match`
//! and handle each case explicitly.

use serde::Deserialize;

/// A lifecycle event from the directory connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DirectoryEvent {
    /// The directory is reachable and its snapshot endpoints are serving.
    /// Triggers a full reconcile pass.
    Ready,

    /// The connection dropped and was re-established. Reconciliation is
    /// re-entrant, so consumers run another pass.
    Resumed,

    /// The directory closed the connection.
    Closed {
        /// Human-readable reason supplied by the directory, if any.
        reason: Option<String>,
    },
}
