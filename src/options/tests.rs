//! Tests for the option builders

use super::*;
use crate::auth::TokenExchange;
use crate::context::{compose, RequestContext, RequestOption, ResponseMeta, SharedOption};
use crate::error::Error;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, Request, StatusCode, Url};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context<'a>() -> RequestContext<'a> {
    RequestContext::new("http://x.test", Method::POST, "http://x.test/items?keep=1")
}

async fn apply<'a>(ctx: &mut RequestContext<'a>, options: Vec<RequestOption<'a>>) -> crate::Result<()> {
    compose(ctx, options, &Client::new()).await
}

async fn apply_shared(options: Vec<SharedOption>) -> crate::Result<RequestContext<'static>> {
    let mut ctx = context();
    let mut all: Vec<RequestOption<'static>> = vec![with_default_request().into()];
    all.extend(options.into_iter().map(RequestOption::from));
    apply(&mut ctx, all).await?;
    Ok(ctx)
}

fn request<'c>(ctx: &'c RequestContext<'_>) -> &'c Request {
    ctx.request.as_ref().unwrap()
}

fn header<'c>(ctx: &'c RequestContext<'_>, name: &str) -> Option<&'c str> {
    request(ctx).headers().get(name).and_then(|v| v.to_str().ok())
}

fn body(ctx: &RequestContext<'_>) -> Vec<u8> {
    request(ctx)
        .body()
        .and_then(|b| b.as_bytes())
        .map(<[u8]>::to_vec)
        .unwrap_or_default()
}

// ============================================================================
// Request Construction
// ============================================================================

#[tokio::test]
async fn test_default_request() {
    let ctx = apply_shared(vec![]).await.unwrap();
    assert_eq!(request(&ctx).method(), Method::POST);
    assert_eq!(request(&ctx).url().as_str(), "http://x.test/items?keep=1");
    assert!(request(&ctx).body().is_none());
}

#[tokio::test]
async fn test_payload_replaces_request() {
    let ctx = apply_shared(vec![
        with_header("X-Lost", "1"),
        with_payload("raw body"),
    ])
    .await
    .unwrap();

    assert_eq!(body(&ctx), b"raw body");
    // headers set before a request-constructing option are discarded
    assert_eq!(header(&ctx, "X-Lost"), None);
    assert_eq!(header(&ctx, "Content-Type"), None);
}

#[tokio::test]
async fn test_last_payload_wins() {
    let ctx = apply_shared(vec![with_payload("first"), with_form_payload("a=b")])
        .await
        .unwrap();
    assert_eq!(body(&ctx), b"a=b");
    assert_eq!(
        header(&ctx, "Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[tokio::test]
async fn test_json_payload() {
    let ctx = apply_shared(vec![with_json_payload(&json!({"name": "x", "n": 2}))])
        .await
        .unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&body(&ctx)).unwrap();
    assert_eq!(sent, json!({"name": "x", "n": 2}));
    assert_eq!(header(&ctx, "Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn test_json_payload_failure_surfaces_on_apply() {
    use std::collections::HashMap;
    // non-string map keys cannot be JSON-encoded
    let mut data = HashMap::new();
    data.insert(vec![1u8], 1);

    let option = with_json_payload(&data);
    let err = apply_shared(vec![option]).await.unwrap_err();
    assert!(err.to_string().contains("Failed to encode JSON payload"));
}

#[tokio::test]
async fn test_values_are_form_encoded() {
    let ctx = apply_shared(vec![with_values(&[("q", "a b"), ("x", "&")])])
        .await
        .unwrap();
    assert_eq!(body(&ctx), b"q=a+b&x=%26");
    assert_eq!(
        header(&ctx, "Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[tokio::test]
async fn test_file_payload_is_multipart() {
    let ctx = apply_shared(vec![with_file_payload("report.csv", "a,b\n1,2")])
        .await
        .unwrap();

    let content_type = header(&ctx, "Content-Type").unwrap().to_string();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    assert!(boundary.starts_with("apimate-"));

    let sent = String::from_utf8(body(&ctx)).unwrap();
    assert!(sent.starts_with(&format!("--{boundary}\r\n")));
    assert!(sent.contains("name=\"file\"; filename=\"report.csv\""));
    assert!(sent.contains("\r\n\r\na,b\n1,2\r\n"));
    assert!(sent.ends_with(&format!("--{boundary}--\r\n")));
}

#[tokio::test]
async fn test_query_replaces_query_string() {
    let ctx = apply_shared(vec![with_query(&[("page", "2"), ("size", "5")])])
        .await
        .unwrap();
    assert_eq!(ctx.endpoint, "http://x.test/items?page=2&size=5");
    assert_eq!(request(&ctx).url().query(), Some("page=2&size=5"));

    let empty: [(&str, &str); 0] = [];
    let ctx = apply_shared(vec![with_query(&empty)]).await.unwrap();
    assert_eq!(ctx.endpoint, "http://x.test/items");
}

#[tokio::test]
async fn test_query_survives_later_payload() {
    let ctx = apply_shared(vec![with_query(&[("a", "1")]), with_payload("x")])
        .await
        .unwrap();
    assert_eq!(request(&ctx).url().as_str(), "http://x.test/items?a=1");
}

// ============================================================================
// Headers and Cookies
// ============================================================================

#[tokio::test]
async fn test_headers_accumulate() {
    let mut extra = HeaderMap::new();
    extra.append("X-Multi", HeaderValue::from_static("b"));
    extra.append("X-Other", HeaderValue::from_static("c"));

    let ctx = apply_shared(vec![with_header("X-Multi", "a"), with_headers(extra)])
        .await
        .unwrap();
    let values: Vec<_> = request(&ctx).headers().get_all("X-Multi").iter().collect();
    assert_eq!(values, vec!["a", "b"]);
    assert_eq!(header(&ctx, "X-Other"), Some("c"));
}

#[tokio::test]
async fn test_cookies_join() {
    let ctx = apply_shared(vec![with_cookie("a", "1"), with_cookie("b", "2")])
        .await
        .unwrap();
    assert_eq!(header(&ctx, "Cookie"), Some("a=1; b=2"));
}

#[tokio::test]
async fn test_header_before_request_fails() {
    let mut ctx = context();
    let err = apply(&mut ctx, vec![with_header("X-A", "1").into()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

// ============================================================================
// Policy
// ============================================================================

#[tokio::test]
async fn test_policy_flags() {
    let ctx = apply_shared(vec![
        with_auto_throttle(false),
        with_auto_retries(0),
        with_tls_skip_verify(true),
    ])
    .await
    .unwrap();
    assert!(!ctx.auto_throttle);
    assert_eq!(ctx.auto_retries, 0);
    assert!(ctx.skip_tls_verify);
}

#[tokio::test]
async fn test_all_pages() {
    let ctx = apply_shared(vec![with_all_pages("page", "X-Total-Pages")])
        .await
        .unwrap();
    assert!(ctx.paging.consume_all);
    assert_eq!(ctx.paging.page_param, "page");
    assert_eq!(ctx.paging.page_count_header, "X-Total-Pages");
}

#[tokio::test]
async fn test_all_pages_requires_names() {
    assert!(apply_shared(vec![with_all_pages("", "X-Total-Pages")]).await.is_err());
    assert!(apply_shared(vec![with_all_pages("page", "")]).await.is_err());
}

#[tokio::test]
async fn test_accepted_errors_replace_checker() {
    let ctx = apply_shared(vec![
        with_accepted_errors([404]),
        with_accepted_errors([409, 410]),
    ])
    .await
    .unwrap();
    assert!(!(ctx.status_checker)(StatusCode::NOT_FOUND));
    assert!((ctx.status_checker)(StatusCode::CONFLICT));
    assert!((ctx.status_checker)(StatusCode::GONE));
}

#[tokio::test]
async fn test_custom_status_checker() {
    let ctx = apply_shared(vec![with_status_checker(|s: StatusCode| s.is_client_error())])
        .await
        .unwrap();
    assert!((ctx.status_checker)(StatusCode::IM_A_TEAPOT));
    assert!(!(ctx.status_checker)(StatusCode::BAD_GATEWAY));
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_bearer_and_header_auth() {
    let ctx = apply_shared(vec![with_bearer_auth("t0k")]).await.unwrap();
    assert_eq!(header(&ctx, "Authorization"), Some("Bearer t0k"));

    let ctx = apply_shared(vec![with_header_auth("X-Api-Key", "k")])
        .await
        .unwrap();
    assert_eq!(header(&ctx, "X-Api-Key"), Some("k"));
}

#[tokio::test]
async fn test_basic_auth() {
    let ctx = apply_shared(vec![with_basic_auth("user", "pass")])
        .await
        .unwrap();
    assert_eq!(header(&ctx, "Authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[tokio::test]
async fn test_token_exchange_sets_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "xyz"})))
        .expect(1)
        .mount(&server)
        .await;

    let option = with_token_exchange(TokenExchange::new(server.uri(), "c", "u", "p"));
    let ctx = apply_shared(vec![option]).await.unwrap();
    assert_eq!(header(&ctx, "Authorization"), Some("Bearer xyz"));
}

#[tokio::test]
async fn test_token_exchange_failure_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let option = with_token_exchange(TokenExchange::new(server.uri(), "c", "u", "p"));
    let err = apply_shared(vec![option, with_auto_retries(9)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}

// ============================================================================
// Receivers
// ============================================================================

fn pages(bodies: &[&'static str]) -> Vec<Bytes> {
    bodies.iter().map(|b| Bytes::from_static(b.as_bytes())).collect()
}

#[tokio::test]
async fn test_json_receiver_sets_headers_and_decodes() {
    let mut target: Vec<i32> = Vec::new();
    {
        let mut ctx = context();
        apply(
            &mut ctx,
            vec![with_default_request().into(), with_json_receiver(&mut target)],
        )
        .await
        .unwrap();
        assert_eq!(header(&ctx, "Accept"), Some("application/json"));
        assert_eq!(header(&ctx, "Content-Type"), Some("application/json"));
        (ctx.receiver)(&pages(&["[1,2]", "[3]"])).unwrap();
    }
    assert_eq!(target, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_json_receiver_keeps_payload_content_type() {
    let mut target = json!(null);
    let (content_type, accept) = {
        let mut ctx = context();
        apply(
            &mut ctx,
            vec![
                with_values(&[("a", "1")]).into(),
                with_json_receiver(&mut target),
            ],
        )
        .await
        .unwrap();
        (
            header(&ctx, "Content-Type").map(str::to_string),
            header(&ctx, "Accept").map(str::to_string),
        )
    };
    assert_eq!(content_type.as_deref(), Some("application/x-www-form-urlencoded"));
    assert_eq!(accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_json_receiver_leaves_target_on_no_pages() {
    let mut target = json!({"untouched": true});
    {
        let mut ctx = context();
        apply(
            &mut ctx,
            vec![with_default_request().into(), with_json_receiver(&mut target)],
        )
        .await
        .unwrap();
        (ctx.receiver)(&[]).unwrap();
    }
    assert_eq!(target, json!({"untouched": true}));
}

#[tokio::test]
async fn test_xml_receiver() {
    #[derive(Debug, Default, serde::Deserialize)]
    struct Item {
        name: String,
    }

    let mut target = Item::default();
    {
        let mut ctx = context();
        apply(&mut ctx, vec![with_xml_receiver(&mut target)])
            .await
            .unwrap();
        (ctx.receiver)(&pages(&["<item><name>widget</name></item>"])).unwrap();
    }
    assert_eq!(target.name, "widget");
}

#[tokio::test]
async fn test_raw_receiver_concatenates() {
    let mut target = b"stale".to_vec();
    {
        let mut ctx = context();
        apply(&mut ctx, vec![with_raw_receiver(&mut target)])
            .await
            .unwrap();
        (ctx.receiver)(&pages(&["ab", "cd"])).unwrap();
    }
    assert_eq!(target, b"abcd");
}

#[tokio::test]
async fn test_custom_receiver_and_null_receiver() {
    let mut count = 0;
    {
        let mut ctx = context();
        apply(
            &mut ctx,
            vec![with_custom_receiver(|pages: &[Bytes]| {
                count = pages.len();
                Ok(())
            })],
        )
        .await
        .unwrap();
        (ctx.receiver)(&pages(&["a", "b", "c"])).unwrap();
    }
    assert_eq!(count, 3);

    let mut ctx = context();
    apply(&mut ctx, vec![with_null_receiver().into()])
        .await
        .unwrap();
    (ctx.receiver)(&pages(&["ignored"])).unwrap();
}

#[tokio::test]
async fn test_cookie_grabber() {
    let mut session = String::from("old");
    let mut missing = String::from("keep");
    {
        let mut ctx = context();
        apply(
            &mut ctx,
            vec![
                with_cookie_grabber("session", &mut session),
                with_cookie_grabber("absent", &mut missing),
            ],
        )
        .await
        .unwrap();

        let meta = ResponseMeta {
            status: StatusCode::OK,
            url: Url::parse("http://x.test/").unwrap(),
            headers: HeaderMap::new(),
            cookies: vec![crate::context::Cookie {
                name: "session".to_string(),
                value: "new".to_string(),
            }],
        };
        for processor in ctx.response_processors {
            processor(&meta).unwrap();
        }
    }
    assert_eq!(session, "new");
    assert_eq!(missing, "keep");
}
