//! Startup configuration.
//!
//! The directory auth token is the single required CLI argument; store
//! credentials come from a two-line local file (username, password);
//! everything else is env-var driven with defaults suitable for local
//! development. A missing token or malformed credentials file is a
//! startup-fatal configuration error.

use std::fs;

use rosterdb_core::types::{DbId, UNSET_ID};

/// Default path of the credentials file.
const DEFAULT_CREDENTIALS_FILE: &str = "user.txt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("usage: rosterdb-worker <directory-token>")]
    MissingToken,

    #[error("could not read credentials file {path:?}: {source}")]
    CredentialsUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials file {path:?} must contain a username line and a password line")]
    CredentialsMalformed { path: String },

    #[error("{name} must be a valid number")]
    BadEnvVar { name: &'static str },
}

/// Resolved worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bearer token for the external directory.
    pub directory_token: String,
    /// Directory base URL.
    pub directory_url: String,
    pub store_host: String,
    pub store_port: u16,
    pub store_database: String,
    pub store_username: String,
    pub store_password: String,
    /// Principal id that always passes administrative permission checks;
    /// [`UNSET_ID`] when no operator is configured.
    pub operator_id: DbId,
}

impl WorkerConfig {
    /// Load configuration from CLI arguments (everything after argv[0]),
    /// the credentials file, and environment variables.
    ///
    /// | Env Var                  | Default     |
    /// |--------------------------|-------------|
    /// | `STORE_CREDENTIALS_FILE` | `user.txt`  |
    /// | `STORE_HOST`             | `127.0.0.1` |
    /// | `STORE_PORT`             | `5432`      |
    /// | `STORE_DATABASE`         | `rosterdb`  |
    /// | `DIRECTORY_URL`          | `http://127.0.0.1:8480` |
    /// | `OPERATOR_PRINCIPAL_ID`  | unset (`-1`) |
    pub fn load(mut args: impl Iterator<Item = String>) -> Result<Self, ConfigError> {
        let directory_token = args.next().ok_or(ConfigError::MissingToken)?;

        let credentials_path = std::env::var("STORE_CREDENTIALS_FILE")
            .unwrap_or_else(|_| DEFAULT_CREDENTIALS_FILE.into());
        let contents = fs::read_to_string(&credentials_path).map_err(|source| {
            ConfigError::CredentialsUnreadable {
                path: credentials_path.clone(),
                source,
            }
        })?;
        let (store_username, store_password) =
            parse_credentials(&contents).ok_or(ConfigError::CredentialsMalformed {
                path: credentials_path,
            })?;

        let store_host = std::env::var("STORE_HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let store_port: u16 = std::env::var("STORE_PORT")
            .unwrap_or_else(|_| "5432".into())
            .parse()
            .map_err(|_| ConfigError::BadEnvVar { name: "STORE_PORT" })?;
        let store_database = std::env::var("STORE_DATABASE").unwrap_or_else(|_| "rosterdb".into());

        let directory_url =
            std::env::var("DIRECTORY_URL").unwrap_or_else(|_| "http://127.0.0.1:8480".into());

        let operator_id: DbId = match std::env::var("OPERATOR_PRINCIPAL_ID") {
            Ok(value) => value.parse().map_err(|_| ConfigError::BadEnvVar {
                name: "OPERATOR_PRINCIPAL_ID",
            })?,
            Err(_) => UNSET_ID,
        };

        Ok(Self {
            directory_token,
            directory_url,
            store_host,
            store_port,
            store_database,
            store_username,
            store_password,
            operator_id,
        })
    }

    /// Compose the store connection URL.
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.store_username,
            self.store_password,
            self.store_host,
            self.store_port,
            self.store_database
        )
    }
}

/// Parse the two-line credentials file: username then password. Extra
/// non-empty lines are ignored with a warning, matching operator habit
/// of leaving notes at the bottom of the file.
fn parse_credentials(contents: &str) -> Option<(String, String)> {
    let mut lines = contents.lines();
    let username = lines.next()?.trim().to_string();
    let password = lines.next()?.trim().to_string();
    if username.is_empty() || password.is_empty() {
        return None;
    }
    for extra in lines {
        if !extra.trim().is_empty() {
            tracing::warn!(line = extra, "Ignoring extra line in credentials file");
        }
    }
    Some((username, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_line_file() {
        assert_eq!(
            parse_credentials("svc\nsecret\n"),
            Some(("svc".into(), "secret".into()))
        );
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            parse_credentials("svc \n secret\n"),
            Some(("svc".into(), "secret".into()))
        );
    }

    #[test]
    fn rejects_missing_password_line() {
        assert_eq!(parse_credentials("svc\n"), None);
        assert_eq!(parse_credentials("svc"), None);
        assert_eq!(parse_credentials(""), None);
    }

    #[test]
    fn rejects_blank_lines() {
        assert_eq!(parse_credentials("\nsecret\n"), None);
        assert_eq!(parse_credentials("svc\n\n"), None);
    }

    #[test]
    fn tolerates_trailing_notes() {
        assert_eq!(
            parse_credentials("svc\nsecret\n\nrotated 2026-07-01\n"),
            Some(("svc".into(), "secret".into()))
        );
    }
}
