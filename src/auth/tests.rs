//! Tests for the auth module

use super::*;
use crate::error::Error;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn exchange(server: &MockServer) -> TokenExchange {
    TokenExchange::new(server.uri(), "my-client", "bot", "s3cret")
}

#[test]
fn test_token_url() {
    let ex = TokenExchange::new("https://id.example.com/", "c", "u", "p");
    assert_eq!(ex.token_url(), "https://id.example.com/application/o/token/");

    let ex = ex.with_token_path("/oauth/token");
    assert_eq!(ex.token_url(), "https://id.example.com/oauth/token");
}

#[test]
fn test_debug_redacts_password() {
    let ex = TokenExchange::new("https://id.example.com", "c", "u", "hunter2");
    let rendered = format!("{ex:?}");
    assert!(rendered.contains("client_id"));
    assert!(!rendered.contains("hunter2"));
}

#[tokio::test]
async fn test_token_exchange_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/application/o/token/"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=my-client"))
        .and(body_string_contains("username=bot"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = exchange(&server)
        .token(&reqwest::Client::new())
        .await
        .unwrap();
    assert_eq!(token, "tok-1");
}

#[tokio::test]
async fn test_token_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "cached",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let ex = exchange(&server);
    let shared = ex.clone();

    assert_eq!(ex.token(&http).await.unwrap(), "cached");
    assert_eq!(ex.token(&http).await.unwrap(), "cached");
    // clones share the cache
    assert_eq!(shared.token(&http).await.unwrap(), "cached");
}

#[tokio::test]
async fn test_clear_cache_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(2)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let ex = exchange(&server);
    ex.token(&http).await.unwrap();
    ex.clear_cache().await;
    ex.token(&http).await.unwrap();
}

#[tokio::test]
async fn test_stale_token_refetched() {
    let server = MockServer::start().await;
    // Inside the expiry skew, so never served from cache
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "short",
            "expires_in": 10
        })))
        .expect(2)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let ex = exchange(&server);
    ex.token(&http).await.unwrap();
    ex.token(&http).await.unwrap();
}

#[tokio::test]
async fn test_token_exchange_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let err = exchange(&server)
        .token(&reqwest::Client::new())
        .await
        .unwrap_err();
    match err {
        Error::Auth { message } => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid_client"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_token_response_without_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "x"})))
        .mount(&server)
        .await;

    let err = exchange(&server)
        .token(&reqwest::Client::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
    assert!(err.to_string().contains("access_token"));
}

#[tokio::test]
async fn test_token_response_not_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html/>"))
        .mount(&server)
        .await;

    let err = exchange(&server)
        .token(&reqwest::Client::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid token response"));
}
