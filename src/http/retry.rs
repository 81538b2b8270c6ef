//! Retry wrapper
//!
//! The upstream APIs this client targets answer 400 for transient validation
//! races, so 400 is the only status retried here. 5xx responses pass through
//! untouched.

use super::exchange::{clone_request, Exchange};
use super::sleep::Sleeper;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Fixed wait between attempts
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retries requests answered with 400
pub struct Retry<'c> {
    inner: Box<dyn Exchange + 'c>,
    attempts: u32,
    sleeper: Arc<dyn Sleeper>,
}

impl<'c> Retry<'c> {
    pub fn new(inner: Box<dyn Exchange + 'c>, attempts: u32, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            inner,
            attempts,
            sleeper,
        }
    }
}

#[async_trait]
impl Exchange for Retry<'_> {
    async fn exchange(&self, request: Request) -> Result<Response> {
        let url = request.url().to_string();
        let mut diagnostic: Option<String> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let response = match self.inner.exchange(clone_request(&request)?).await {
                Ok(response) => response,
                Err(Error::Http(source)) => return Err(Error::transport(source, diagnostic)),
                Err(e) => return Err(e),
            };

            if response.status() != StatusCode::BAD_REQUEST {
                return Ok(response);
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => return Err(Error::transport(e, diagnostic)),
            };

            if attempt >= self.attempts {
                return Err(Error::RetriesExhausted {
                    url,
                    attempts: attempt,
                    body,
                });
            }

            warn!(
                "Request to {} rejected with 400, attempt {}/{}, retrying in {:?}",
                url, attempt, self.attempts, RETRY_DELAY
            );
            diagnostic = Some(body);
            self.sleeper.sleep(RETRY_DELAY).await;
        }
    }
}
