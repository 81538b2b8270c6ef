//! Request-shaping options
//!
//! Request-constructing options (`with_default_request`, the payload
//! options) replace the context's request wholesale; the last one applied
//! wins. Header options mutate whatever request is current.

use crate::context::{PagingConfig, RequestContext, SharedOption};
use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE, COOKIE};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Build an empty request for the context's method and endpoint
pub fn with_default_request() -> SharedOption {
    SharedOption::new(|ctx| {
        ctx.request = Some(ctx.build_request(None)?);
        Ok(())
    })
}

/// Send `body` as is
pub fn with_payload(body: impl Into<Bytes>) -> SharedOption {
    let body = body.into();
    SharedOption::new(move |ctx| replace_request(ctx, body.clone(), None))
}

/// Send an already form-encoded `body`
pub fn with_form_payload(body: impl Into<Bytes>) -> SharedOption {
    let body = body.into();
    SharedOption::new(move |ctx| replace_request(ctx, body.clone(), Some(FORM_CONTENT_TYPE)))
}

/// Send `data` serialized as JSON
///
/// Serialization happens once, here; a failure surfaces when the option is
/// applied.
pub fn with_json_payload<T: Serialize + ?Sized>(data: &T) -> SharedOption {
    let encoded = serde_json::to_vec(data)
        .map(Bytes::from)
        .map_err(|e| format!("Failed to encode JSON payload: {e}"));

    SharedOption::new(move |ctx| match &encoded {
        Ok(body) => replace_request(ctx, body.clone(), Some(JSON_CONTENT_TYPE)),
        Err(message) => Err(Error::config(message.clone())),
    })
}

/// Send `values` form-encoded
pub fn with_values<K, V>(values: &[(K, V)]) -> SharedOption
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(values.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish();
    with_form_payload(encoded)
}

/// Upload `data` as a multipart form file in the field `file`
pub fn with_file_payload(name: impl Into<String>, data: impl Into<Bytes>) -> SharedOption {
    let boundary = format!("apimate-{}", uuid::Uuid::new_v4().simple());
    let body = multipart_file_body(&boundary, &name.into(), &data.into());
    let content_type = format!("multipart/form-data; boundary={boundary}");

    SharedOption::new(move |ctx| replace_request(ctx, body.clone(), Some(content_type.as_str())))
}

/// Replace the endpoint's query string with `values`
pub fn with_query<K, V>(values: &[(K, V)]) -> SharedOption
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let pairs: Vec<(String, String)> = values
        .iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect();

    SharedOption::new(move |ctx| {
        let mut url = Url::parse(&ctx.endpoint)?;
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&pairs);
        }
        ctx.endpoint = url.to_string();
        *ctx.request_mut()?.url_mut() = url;
        Ok(())
    })
}

/// Add a header value
pub fn with_header(key: impl Into<String>, value: impl Into<String>) -> SharedOption {
    let key = key.into();
    let value = value.into();
    SharedOption::new(move |ctx| ctx.append_header(&key, &value))
}

/// Add every value of `headers`
pub fn with_headers(headers: HeaderMap) -> SharedOption {
    SharedOption::new(move |ctx| {
        let target = ctx.request_mut()?.headers_mut();
        for (key, value) in &headers {
            target.append(key.clone(), value.clone());
        }
        Ok(())
    })
}

/// Send a cookie, joining it onto any existing `Cookie` header
pub fn with_cookie(name: impl Into<String>, value: impl Into<String>) -> SharedOption {
    let pair = format!("{}={}", name.into(), value.into());
    SharedOption::new(move |ctx| {
        let existing = ctx
            .request_mut()?
            .headers()
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match existing {
            Some(existing) => ctx.set_header(COOKIE.as_str(), &format!("{existing}; {pair}")),
            None => ctx.set_header(COOKIE.as_str(), &pair),
        }
    })
}

/// Enable or disable backing off on 429
pub fn with_auto_throttle(enabled: bool) -> SharedOption {
    SharedOption::new(move |ctx| {
        ctx.auto_throttle = enabled;
        Ok(())
    })
}

/// Set the number of attempts made on 400 (0 disables retrying)
pub fn with_auto_retries(attempts: u32) -> SharedOption {
    SharedOption::new(move |ctx| {
        ctx.auto_retries = attempts;
        Ok(())
    })
}

/// Accept invalid TLS certificates
pub fn with_tls_skip_verify(skip: bool) -> SharedOption {
    SharedOption::new(move |ctx| {
        ctx.skip_tls_verify = skip;
        Ok(())
    })
}

/// Fetch every page, numbering pages with `page_param` until the count in
/// `pages_header` is reached
pub fn with_all_pages(page_param: impl Into<String>, pages_header: impl Into<String>) -> SharedOption {
    let paging = PagingConfig {
        consume_all: true,
        page_param: page_param.into(),
        page_count_header: pages_header.into(),
    };

    SharedOption::new(move |ctx| {
        if paging.page_param.is_empty() || paging.page_count_header.is_empty() {
            return Err(Error::config(
                "paging needs both a page parameter and a page count header",
            ));
        }
        ctx.paging = paging.clone();
        Ok(())
    })
}

/// Treat these statuses as success without decoding the body
pub fn with_accepted_errors(codes: impl IntoIterator<Item = u16>) -> SharedOption {
    let codes: Arc<HashSet<u16>> = Arc::new(codes.into_iter().collect());
    with_status_checker(move |status| codes.contains(&status.as_u16()))
}

/// Decide with `checker` which statuses succeed without decoding
pub fn with_status_checker<F>(checker: F) -> SharedOption
where
    F: Fn(StatusCode) -> bool + Send + Sync + 'static,
{
    let checker: Arc<dyn Fn(StatusCode) -> bool + Send + Sync> = Arc::new(checker);
    SharedOption::new(move |ctx| {
        ctx.status_checker = Arc::clone(&checker);
        Ok(())
    })
}

fn replace_request(
    ctx: &mut RequestContext<'_>,
    body: Bytes,
    content_type: Option<&str>,
) -> Result<()> {
    ctx.request = Some(ctx.build_request(Some(body))?);
    if let Some(content_type) = content_type {
        ctx.set_header(CONTENT_TYPE.as_str(), content_type)?;
    }
    Ok(())
}

fn multipart_file_body(boundary: &str, file_name: &str, data: &[u8]) -> Bytes {
    let escaped = file_name.replace('\\', "\\\\").replace('"', "\\\"");
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{escaped}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Bytes::from(body)
}
