//! One-shot password generation for newly provisioned credential accounts.
//!
//! The password is handed to the requester exactly once and passed to the
//! store's `CREATE ROLE`; it is never persisted anywhere in rosterdb.

use rand::Rng;

/// Length of generated passwords.
pub const PASSWORD_LENGTH: usize = 15;

/// Generate a random alphanumeric password of [`PASSWORD_LENGTH`] characters.
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}
