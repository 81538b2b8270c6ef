//! The primitive exchange and the chain builder

use super::retry::Retry;
use super::sleep::Sleeper;
use super::throttle::Throttle;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use std::sync::Arc;
use tracing::debug;

/// Sends one request and returns its response
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Perform the exchange
    async fn exchange(&self, request: Request) -> Result<Response>;
}

/// Sends straight through a reqwest client
#[derive(Debug, Clone, Copy)]
pub struct Direct<'c> {
    client: &'c Client,
}

impl<'c> Direct<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Exchange for Direct<'_> {
    async fn exchange(&self, request: Request) -> Result<Response> {
        debug!("{} {}", request.method(), request.url());
        let response = self.client.execute(request).await?;
        debug!("{} from {}", response.status().as_u16(), response.url());
        Ok(response)
    }
}

/// Policy flags governing the wrapper chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainPolicy {
    /// Install the 429 throttle wrapper
    pub auto_throttle: bool,
    /// Attempts made by the 400 retry wrapper (0 leaves it out)
    pub auto_retries: u32,
}

/// Build the fixed chain `Throttle(Retry(Direct))`
///
/// A wrapper whose policy disables it is left out entirely.
pub fn build_chain<'c>(
    client: &'c Client,
    policy: ChainPolicy,
    sleeper: Arc<dyn Sleeper>,
) -> Box<dyn Exchange + 'c> {
    let mut chain: Box<dyn Exchange + 'c> = Box::new(Direct::new(client));
    if policy.auto_retries > 0 {
        chain = Box::new(Retry::new(chain, policy.auto_retries, Arc::clone(&sleeper)));
    }
    if policy.auto_throttle {
        chain = Box::new(Throttle::new(chain, sleeper));
    }
    chain
}

/// Copy a request so it can be sent again
pub fn clone_request(request: &Request) -> Result<Request> {
    request
        .try_clone()
        .ok_or_else(|| Error::config("request body cannot be replayed"))
}
