//! Shared types and pure helpers for rosterdb.
//!
//! This crate has no internal dependencies so its contents can be used
//! by the repository layer, the sync engine, and any future CLI tooling.

pub mod naming;
pub mod password;
pub mod types;
