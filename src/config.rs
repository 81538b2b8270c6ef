//! Client profiles
//!
//! A profile describes an [`ApiClient`] in YAML (or JSON, which YAML
//! accepts): base URL, transport settings, auth and default headers.
//!
//! ```yaml
//! base_url: https://api.example.com/v1
//! timeout_seconds: 10
//! auto_retries: 2
//! headers:
//!   X-Tenant: acme
//! auth:
//!   type: bearer
//!   token: secret
//! ```

use crate::auth::TokenExchange;
use crate::client::{ApiClient, DEFAULT_TIMEOUT};
use crate::context::{SharedOption, DEFAULT_AUTO_RETRIES};
use crate::error::{Error, Result, ResultExt};
use crate::options::{
    with_auto_retries, with_auto_throttle, with_basic_auth, with_bearer_auth, with_header,
    with_header_auth, with_tls_skip_verify, with_token_exchange,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Client Config
// ============================================================================

/// Client configuration loaded from a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for all requests
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Attempts made on 400
    #[serde(default = "default_auto_retries")]
    pub auto_retries: u32,

    /// Back off on 429
    #[serde(default = "default_true")]
    pub auto_throttle: bool,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Authentication
    #[serde(default)]
    pub auth: AuthProfile,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_auto_retries() -> u32 {
    DEFAULT_AUTO_RETRIES
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Auth Profile
// ============================================================================

/// Authentication section of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthProfile {
    /// No authentication
    #[default]
    None,

    /// `Authorization: Bearer <token>`
    Bearer { token: String },

    /// Token in a custom header
    Header { header: String, token: String },

    /// HTTP basic
    Basic { username: String, password: String },

    /// Client-credentials token exchange
    TokenExchange {
        url: String,
        client_id: String,
        username: String,
        password: String,
        #[serde(default)]
        token_path: Option<String>,
    },
}

impl AuthProfile {
    fn option(&self) -> Option<SharedOption> {
        match self {
            AuthProfile::None => None,
            AuthProfile::Bearer { token } => Some(with_bearer_auth(token.clone())),
            AuthProfile::Header { header, token } => {
                Some(with_header_auth(header.clone(), token.clone()))
            }
            AuthProfile::Basic { username, password } => Some(with_basic_auth(username, password)),
            AuthProfile::TokenExchange {
                url,
                client_id,
                username,
                password,
                token_path,
            } => {
                let mut exchange = TokenExchange::new(url, client_id, username, password);
                if let Some(path) = token_path {
                    exchange = exchange.with_token_path(path);
                }
                Some(with_token_exchange(exchange))
            }
        }
    }
}

impl ClientConfig {
    /// Create a config with defaults for `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: None,
            auto_retries: DEFAULT_AUTO_RETRIES,
            auto_throttle: true,
            skip_tls_verify: false,
            headers: BTreeMap::new(),
            auth: AuthProfile::None,
        }
    }

    /// Load a profile file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read profile '{}': {e}", path.display()))
        })?;
        Self::from_str(&content).with_context(|| format!("Invalid profile '{}'", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("profile base_url must not be empty"));
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Default options reproducing this profile
    pub fn default_options(&self) -> Vec<SharedOption> {
        let mut options = vec![
            with_auto_retries(self.auto_retries),
            with_auto_throttle(self.auto_throttle),
            with_tls_skip_verify(self.skip_tls_verify),
        ];
        options.extend(
            self.headers
                .iter()
                .map(|(key, value)| with_header(key.clone(), value.clone())),
        );
        options.extend(self.auth.option());
        options
    }

    /// Build a client from this profile
    pub fn into_client(self) -> Result<ApiClient> {
        let mut builder = ApiClient::builder(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout_seconds))
            .options(self.default_options());
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }
}

impl FromStr for ClientConfig {
    type Err = Error;

    /// Parse a profile from YAML or JSON text
    fn from_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
