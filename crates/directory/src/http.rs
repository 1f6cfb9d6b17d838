//! REST implementation of the directory client.
//!
//! Wraps the directory's HTTP API using [`reqwest`]. Every request
//! carries the bearer token supplied at startup. Events are delivered
//! over a long-poll endpoint.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use rosterdb_core::types::DbId;

use crate::client::{CommunitySnapshot, DirectoryClient, DirectoryError, RoleEntry};
use crate::events::DirectoryEvent;

/// HTTP client for the external membership directory.
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpDirectoryClient {
    /// Create a new client.
    ///
    /// * `base_url` - directory base URL, e.g. `https://directory.internal`.
    /// * `token`    - bearer token passed with every request.
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    async fn get(&self, path: &str) -> Result<Response, DirectoryError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(response)
    }

    /// Decode a 2xx response as JSON, or surface the status and body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, DirectoryError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DirectoryError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn list_communities(&self) -> Result<Vec<CommunitySnapshot>, DirectoryError> {
        let response = self.get("/v1/communities").await?;
        Self::parse_response(response).await
    }

    async fn list_known_principals(&self) -> Result<Vec<DbId>, DirectoryError> {
        let response = self.get("/v1/principals").await?;
        Self::parse_response(response).await
    }

    async fn resolve_display_name(
        &self,
        user_id: DbId,
    ) -> Result<Option<String>, DirectoryError> {
        #[derive(serde::Deserialize)]
        struct Principal {
            display_name: String,
        }

        let response = self.get(&format!("/v1/principals/{user_id}")).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let principal: Principal = Self::parse_response(response).await?;
        Ok(Some(principal.display_name))
    }

    async fn list_roles(&self, community_id: DbId) -> Result<Vec<RoleEntry>, DirectoryError> {
        let response = self
            .get(&format!("/v1/communities/{community_id}/roles"))
            .await?;
        Self::parse_response(response).await
    }

    async fn next_event(&self) -> Result<DirectoryEvent, DirectoryError> {
        // Long poll; the directory holds the request open until an event
        // occurs or its own poll window lapses, in which case it answers
        // 204 and we poll again.
        loop {
            let response = self.get("/v1/events/next").await?;
            if response.status() == StatusCode::NO_CONTENT {
                continue;
            }
            return Self::parse_response(response).await;
        }
    }
}
