//! Request context types
//!
//! The context owns the in-progress `reqwest::Request` together with every
//! policy the pipeline reads while executing it.

use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, StatusCode, Url};
use std::sync::Arc;

/// Decides which non-success statuses are accepted without decoding
pub type StatusChecker = Arc<dyn Fn(StatusCode) -> bool + Send + Sync>;

/// Decodes the ordered page bodies of a successful call
pub type Receiver<'a> = Box<dyn FnOnce(&[Bytes]) -> Result<()> + Send + 'a>;

/// Side-channel inspector run against the final response
pub type ResponseProcessor<'a> = Box<dyn FnOnce(&ResponseMeta) -> Result<()> + Send + 'a>;

/// Default number of attempts made by the retry wrapper
pub const DEFAULT_AUTO_RETRIES: u32 = 3;

/// Page-number pagination settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingConfig {
    /// Fetch every page instead of a single response
    pub consume_all: bool,
    /// Query parameter carrying the page number (e.g. `page`)
    pub page_param: String,
    /// Response header carrying the total page count (e.g. `X-Total-Pages`)
    pub page_count_header: String,
}

/// A cookie set by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Snapshot of a response taken before its body is consumed
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// HTTP status
    pub status: StatusCode,
    /// Final URL of the request
    pub url: Url,
    /// Response headers
    pub headers: HeaderMap,
    /// Cookies from `Set-Cookie` headers
    pub cookies: Vec<Cookie>,
}

impl ResponseMeta {
    /// Capture status, headers and cookies of a response
    pub fn from_response(response: &reqwest::Response) -> Self {
        let cookies = response
            .cookies()
            .map(|c| Cookie {
                name: c.name().to_string(),
                value: c.value().to_string(),
            })
            .collect();

        Self {
            status: response.status(),
            url: response.url().clone(),
            headers: response.headers().clone(),
            cookies,
        }
    }

    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Find a cookie by name
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }
}

/// Mutable configuration of a single call
pub struct RequestContext<'a> {
    /// Base URL of the owning client
    pub api_url: String,
    /// HTTP method
    pub method: Method,
    /// Full request URL, rewritten by query options
    pub endpoint: String,
    /// The request under construction
    pub request: Option<Request>,
    /// Back off and retry on 429
    pub auto_throttle: bool,
    /// Attempts made on 400 (0 disables retrying)
    pub auto_retries: u32,
    /// Statuses accepted as success without decoding
    pub status_checker: StatusChecker,
    /// Pagination settings
    pub paging: PagingConfig,
    /// Primary body decoder
    pub receiver: Receiver<'a>,
    /// Secondary response inspectors, run in insertion order
    pub response_processors: Vec<ResponseProcessor<'a>>,
    /// Accept invalid TLS certificates
    pub skip_tls_verify: bool,
}

impl<'a> RequestContext<'a> {
    /// Create a context with pipeline defaults and no request yet
    pub fn new(api_url: impl Into<String>, method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            method,
            endpoint: endpoint.into(),
            request: None,
            auto_throttle: true,
            auto_retries: DEFAULT_AUTO_RETRIES,
            status_checker: Arc::new(|_: StatusCode| false),
            paging: PagingConfig::default(),
            receiver: Box::new(|_: &[Bytes]| Ok(())),
            response_processors: Vec::new(),
            skip_tls_verify: false,
        }
    }

    /// Build a fresh request for the current method and endpoint
    pub fn build_request(&self, body: Option<Bytes>) -> Result<Request> {
        let url = Url::parse(&self.endpoint)?;
        let mut request = Request::new(self.method.clone(), url);
        if let Some(body) = body {
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }

    /// Get the request, failing if no request-constructing option ran yet
    pub fn request_mut(&mut self) -> Result<&mut Request> {
        self.request
            .as_mut()
            .ok_or_else(|| Error::config("request has not been constructed"))
    }

    /// Replace a header on the request
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_header(name, value)?;
        self.request_mut()?.headers_mut().insert(name, value);
        Ok(())
    }

    /// Set a header only when the request does not carry it yet
    pub fn set_default_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_header(name, value)?;
        self.request_mut()?.headers_mut().entry(name).or_insert(value);
        Ok(())
    }

    /// Add a header value, keeping existing values
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_header(name, value)?;
        self.request_mut()?.headers_mut().append(name, value);
        Ok(())
    }
}

impl std::fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("endpoint", &self.endpoint)
            .field("has_request", &self.request.is_some())
            .field("auto_throttle", &self.auto_throttle)
            .field("auto_retries", &self.auto_retries)
            .field("paging", &self.paging)
            .field("response_processors", &self.response_processors.len())
            .field("skip_tls_verify", &self.skip_tls_verify)
            .finish_non_exhaustive()
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::invalid_header(name, e))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name, e))?;
    Ok((header_name, header_value))
}
