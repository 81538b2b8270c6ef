//! Client-credentials token exchange
//!
//! Posts a form to the identity provider's token endpoint and caches the
//! returned bearer token until it expires.

use super::types::AccessToken;
use crate::error::{Error, Result};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default token endpoint path, relative to the provider base URL
pub const DEFAULT_TOKEN_PATH: &str = "application/o/token/";

/// Credentials for a client-credentials token exchange
///
/// Clones share one token cache.
#[derive(Clone)]
pub struct TokenExchange {
    base_url: String,
    token_path: String,
    client_id: String,
    username: String,
    password: String,
    cached_token: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenExchange {
    /// Create a token exchange against `base_url`
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            client_id: client_id.into(),
            username: username.into(),
            password: password.into(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Use a different token endpoint path
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Full URL of the token endpoint
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.token_path.trim_start_matches('/')
        )
    }

    /// Get a valid token, fetching a new one if the cache is empty or stale
    pub async fn token(&self, http: &Client) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_usable_at(Utc::now()) {
                    return Ok(token.value.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if token.is_usable_at(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch(http).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);

        Ok(value)
    }

    /// Drop the cached token
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    async fn fetch(&self, http: &Client) -> Result<AccessToken> {
        let url = self.token_url();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];

        debug!("Requesting token from {}", url);
        let response = http.post(&url).form(&form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Invalid token response: {e}")))?;

        let token = AccessToken::from_response(&body, Utc::now())?;
        info!("Obtained access token for client {}", self.client_id);
        Ok(token)
    }
}

impl std::fmt::Debug for TokenExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenExchange")
            .field("token_url", &self.token_url())
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
