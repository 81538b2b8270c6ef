//! Option composition
//!
//! Options are applied in order; later options overwrite what earlier ones
//! set for the same field. A token exchange is the only step allowed to do
//! network I/O and runs in sequence with the others.

use super::types::RequestContext;
use crate::auth::TokenExchange;
use crate::error::Result;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

type ApplyOnce<'a> = Box<dyn FnOnce(&mut RequestContext<'a>) -> Result<()> + Send + 'a>;
type ApplyShared = Arc<dyn Fn(&mut RequestContext<'_>) -> Result<()> + Send + Sync>;

enum Step<'a> {
    Apply(ApplyOnce<'a>),
    Exchange(TokenExchange),
}

/// A one-shot mutation of a [`RequestContext`]
///
/// May borrow caller data for `'a`, which is how receivers hand decoded
/// values back to the caller.
pub struct RequestOption<'a> {
    step: Step<'a>,
}

impl<'a> RequestOption<'a> {
    /// Create an option from a closure
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut RequestContext<'a>) -> Result<()> + Send + 'a,
    {
        Self {
            step: Step::Apply(Box::new(f)),
        }
    }

    pub(crate) fn token_exchange(exchange: TokenExchange) -> Self {
        Self {
            step: Step::Exchange(exchange),
        }
    }

    /// Apply this option to a context
    ///
    /// `http` is only used by token exchange options.
    pub async fn apply(self, ctx: &mut RequestContext<'a>, http: &Client) -> Result<()> {
        match self.step {
            Step::Apply(f) => f(ctx),
            Step::Exchange(exchange) => {
                let token = exchange.token(http).await?;
                ctx.set_header(AUTHORIZATION.as_str(), &format!("Bearer {token}"))
            }
        }
    }
}

impl std::fmt::Debug for RequestOption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.step {
            Step::Apply(_) => f.write_str("RequestOption(apply)"),
            Step::Exchange(exchange) => f.debug_tuple("RequestOption").field(exchange).finish(),
        }
    }
}

#[derive(Clone)]
enum SharedStep {
    Apply(ApplyShared),
    Exchange(TokenExchange),
}

/// A reusable mutation of a [`RequestContext`]
///
/// Client-level defaults are shared options: they are captured once when the
/// client is built and applied to every call.
#[derive(Clone)]
pub struct SharedOption {
    step: SharedStep,
}

impl SharedOption {
    /// Create a reusable option from a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut RequestContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            step: SharedStep::Apply(Arc::new(f)),
        }
    }

    pub(crate) fn token_exchange(exchange: TokenExchange) -> Self {
        Self {
            step: SharedStep::Exchange(exchange),
        }
    }
}

impl<'a> From<SharedOption> for RequestOption<'a> {
    fn from(option: SharedOption) -> Self {
        match option.step {
            SharedStep::Apply(f) => RequestOption::new(move |ctx| f(ctx)),
            SharedStep::Exchange(exchange) => RequestOption::token_exchange(exchange),
        }
    }
}

impl std::fmt::Debug for SharedOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.step {
            SharedStep::Apply(_) => f.write_str("SharedOption(apply)"),
            SharedStep::Exchange(exchange) => f.debug_tuple("SharedOption").field(exchange).finish(),
        }
    }
}

/// Apply options in order, stopping at the first failure
///
/// The context is left as the failing option found it; callers discard it.
pub async fn compose<'a, I>(ctx: &mut RequestContext<'a>, options: I, http: &Client) -> Result<()>
where
    I: IntoIterator<Item = RequestOption<'a>>,
{
    for (index, option) in options.into_iter().enumerate() {
        if let Err(e) = option.apply(ctx, http).await {
            debug!("Option {} failed for {}: {}", index, ctx.endpoint, e);
            return Err(e);
        }
    }
    Ok(())
}
