//! API client
//!
//! [`ApiClient`] owns the base URL, the transport and the client-level
//! default options. Each call builds a fresh [`RequestContext`], runs it
//! through the wrapper chain and the pagination loop, and processes the
//! result. Nothing about a call outlives it.

use crate::context::{compose, RequestContext, RequestOption, SharedOption};
use crate::error::{Error, Result};
use crate::http::{build_chain, ChainPolicy, Sleeper, TokioSleeper};
use crate::options::{with_accepted_errors, with_default_request, with_null_receiver};
use crate::pagination;
use crate::response::ResponseHandler;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options every call starts with, before client and call options
pub fn pipeline_defaults() -> Vec<SharedOption> {
    vec![
        with_default_request(),
        with_null_receiver(),
        with_accepted_errors(std::iter::empty()),
    ]
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    api_url: String,
    timeout: Duration,
    user_agent: String,
    defaults: Vec<SharedOption>,
    sleeper: Arc<dyn Sleeper>,
}

impl ApiClientBuilder {
    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Add a default option applied to every call
    #[must_use]
    pub fn option(mut self, option: SharedOption) -> Self {
        self.defaults.push(option);
        self
    }

    /// Add several default options
    #[must_use]
    pub fn options(mut self, options: impl IntoIterator<Item = SharedOption>) -> Self {
        self.defaults.extend(options);
        self
    }

    /// Replace how backoff delays are waited out
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient> {
        let secure = transport(self.timeout, &self.user_agent, false)?;
        let insecure = transport(self.timeout, &self.user_agent, true)?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                api_url: self.api_url,
                defaults: self.defaults,
                secure,
                insecure,
                sleeper: self.sleeper,
            }),
        })
    }
}

fn transport(timeout: Duration, user_agent: &str, skip_tls_verify: bool) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .redirect(Policy::none())
        .danger_accept_invalid_certs(skip_tls_verify)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))
}

struct ClientInner {
    api_url: String,
    defaults: Vec<SharedOption>,
    secure: Client,
    insecure: Client,
    sleeper: Arc<dyn Sleeper>,
}

/// HTTP API client running the request pipeline
///
/// Cheap to clone; clones share configuration and connection pools.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Create a client for `api_url` with default options
    pub fn new(api_url: impl Into<String>, defaults: Vec<SharedOption>) -> Result<Self> {
        Self::builder(api_url).options(defaults).build()
    }

    /// Create a client builder
    pub fn builder(api_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            api_url: api_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("apimate/{}", env!("CARGO_PKG_VERSION")),
            defaults: Vec::new(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Base URL
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Join `ep` onto the base URL
    pub fn endpoint(&self, ep: &str) -> String {
        if ep.is_empty() {
            return self.inner.api_url.clone();
        }
        format!(
            "{}/{}",
            self.inner.api_url.trim_end_matches('/'),
            ep.trim_start_matches('/')
        )
    }

    /// Execute a request described by `options`
    ///
    /// Options apply after the pipeline defaults and the client defaults.
    pub async fn request<'a>(
        &self,
        method: Method,
        ep: &str,
        options: Vec<RequestOption<'a>>,
    ) -> Result<()> {
        let endpoint = self.endpoint(ep);
        debug!("{} {}", method, endpoint);

        let mut ctx = RequestContext::new(self.inner.api_url.clone(), method, endpoint);

        let effective: Vec<RequestOption<'a>> = pipeline_defaults()
            .into_iter()
            .chain(self.inner.defaults.iter().cloned())
            .map(RequestOption::from)
            .chain(options)
            .collect();
        compose(&mut ctx, effective, &self.inner.secure).await?;

        let request = ctx
            .request
            .take()
            .ok_or_else(|| Error::config("no request was constructed"))?;
        let transport = if ctx.skip_tls_verify {
            &self.inner.insecure
        } else {
            &self.inner.secure
        };
        let policy = ChainPolicy {
            auto_throttle: ctx.auto_throttle,
            auto_retries: ctx.auto_retries,
        };
        let chain = build_chain(transport, policy, Arc::clone(&self.inner.sleeper));

        let pages = pagination::consume(chain.as_ref(), request, &ctx.paging).await?;
        debug!("{} page(s) from {}", pages.len(), pages.last.url);

        ResponseHandler::from_context(ctx).process(&pages)?;
        Ok(())
    }

    /// GET `ep`
    pub async fn get<'a>(&self, ep: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.request(Method::GET, ep, options).await
    }

    /// POST `ep`
    pub async fn post<'a>(&self, ep: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.request(Method::POST, ep, options).await
    }

    /// PUT `ep`
    pub async fn put<'a>(&self, ep: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.request(Method::PUT, ep, options).await
    }

    /// PATCH `ep`
    pub async fn patch<'a>(&self, ep: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.request(Method::PATCH, ep, options).await
    }

    /// DELETE `ep`
    pub async fn delete<'a>(&self, ep: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.request(Method::DELETE, ep, options).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.inner.api_url)
            .field("defaults", &self.inner.defaults.len())
            .finish_non_exhaustive()
    }
}
