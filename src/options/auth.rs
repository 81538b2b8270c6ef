//! Authentication options

use crate::auth::TokenExchange;
use crate::context::SharedOption;
use base64::Engine;
use reqwest::header::AUTHORIZATION;

/// Send `Authorization: Bearer <token>`
pub fn with_bearer_auth(token: impl Into<String>) -> SharedOption {
    let value = format!("Bearer {}", token.into());
    SharedOption::new(move |ctx| ctx.set_header(AUTHORIZATION.as_str(), &value))
}

/// Send `token` in a custom header
pub fn with_header_auth(header: impl Into<String>, token: impl Into<String>) -> SharedOption {
    let header = header.into();
    let token = token.into();
    SharedOption::new(move |ctx| ctx.set_header(&header, &token))
}

/// Send HTTP basic credentials
pub fn with_basic_auth(username: impl AsRef<str>, password: impl AsRef<str>) -> SharedOption {
    let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
    let value = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    );
    SharedOption::new(move |ctx| ctx.set_header(AUTHORIZATION.as_str(), &value))
}

/// Obtain a bearer token through a client-credentials exchange
///
/// The exchange happens when the option is applied, before the main request
/// is sent. Tokens are cached by the [`TokenExchange`].
pub fn with_token_exchange(exchange: TokenExchange) -> SharedOption {
    SharedOption::token_exchange(exchange)
}
