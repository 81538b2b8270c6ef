//! Authentication module
//!
//! Header-based schemes (bearer, custom header, basic) are plain options in
//! [`crate::options`]. This module holds the one scheme that needs network
//! I/O: a client-credentials [`TokenExchange`] with token caching.

mod exchange;
mod types;

pub use exchange::{TokenExchange, DEFAULT_TOKEN_PATH};
pub use types::AccessToken;

#[cfg(test)]
mod tests;
