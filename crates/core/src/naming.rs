//! Credential account name rules.
//!
//! Account names become store-level login roles, so validation is strict:
//! a conservative identifier charset plus a reserved-name blocklist. The
//! name is interpolated into `CREATE ROLE` DDL (identifiers cannot be
//! bound as statement parameters), which makes the charset check a hard
//! requirement, not a style preference.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Names that may never be provisioned as credential accounts.
pub const RESERVED_ACCOUNT_NAMES: &[&str] = &["admin", "postgres", "root"];

/// Minimum account name length.
pub const MIN_ACCOUNT_NAME_LENGTH: usize = 3;

/// Maximum account name length (Postgres identifier limit is 63 bytes;
/// stay comfortably under it).
pub const MAX_ACCOUNT_NAME_LENGTH: usize = 48;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an account name was rejected before any store call was made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("account name {0:?} is system reserved")]
    Reserved(String),

    #[error("account name {0:?} must be {MIN_ACCOUNT_NAME_LENGTH}-{MAX_ACCOUNT_NAME_LENGTH} characters")]
    BadLength(String),

    #[error("account name {0:?} must start with a lowercase letter and contain only [a-z0-9_]")]
    BadCharset(String),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a credential account name against the reserved list and the
/// identifier charset. Pure; performs no store interaction.
pub fn validate_account_name(name: &str) -> Result<(), NameError> {
    if name.len() < MIN_ACCOUNT_NAME_LENGTH || name.len() > MAX_ACCOUNT_NAME_LENGTH {
        return Err(NameError::BadLength(name.to_string()));
    }

    let mut chars = name.chars();
    let starts_lower = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !starts_lower || !rest_ok {
        return Err(NameError::BadCharset(name.to_string()));
    }

    if RESERVED_ACCOUNT_NAMES.contains(&name) {
        return Err(NameError::Reserved(name.to_string()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
