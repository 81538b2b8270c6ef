//! Throttle wrapper
//!
//! Reacts to 429 only. Every other response, error statuses included, is
//! handed back as is.

use super::exchange::{clone_request, Exchange};
use super::sleep::Sleeper;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Total attempts before a rate-limited call fails
pub const MAX_THROTTLE_ATTEMPTS: u32 = 3;

/// Backs off and resends when rate limited
pub struct Throttle<'c> {
    inner: Box<dyn Exchange + 'c>,
    sleeper: Arc<dyn Sleeper>,
}

impl<'c> Throttle<'c> {
    pub fn new(inner: Box<dyn Exchange + 'c>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { inner, sleeper }
    }
}

#[async_trait]
impl Exchange for Throttle<'_> {
    async fn exchange(&self, request: Request) -> Result<Response> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let response = self.inner.exchange(clone_request(&request)?).await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let retry_after = retry_after_seconds(&response);
            if attempt >= MAX_THROTTLE_ATTEMPTS {
                return Err(Error::RateLimited {
                    attempts: attempt,
                    retry_after_seconds: retry_after,
                });
            }

            warn!(
                "Rate limited (429) on {}, attempt {}/{}, waiting {}s",
                request.url(),
                attempt,
                MAX_THROTTLE_ATTEMPTS,
                retry_after
            );
            self.sleeper.sleep(Duration::from_secs(retry_after)).await;
        }
    }
}

/// Seconds to wait from `Retry-After`; missing, zero or invalid means 1
pub fn retry_after_seconds(response: &Response) -> u64 {
    parse_retry_after(
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok()),
    )
}

pub(crate) fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(1)
}
