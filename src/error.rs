//! Error types for apimate
//!
//! Every stage of the pipeline (option composition, the wrapper chain,
//! pagination, response processing and decoding) reports failures through
//! the single [`Error`] enum defined here. A call produces at most one error.

use thiserror::Error;

/// The main error type for apimate
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request failed after earlier rejection ({diagnostic}): {source}")]
    HttpAfterRejection {
        diagnostic: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Rate limited {attempts} times, last retry after {retry_after_seconds}s")]
    RateLimited {
        attempts: u32,
        retry_after_seconds: u64,
    },

    #[error("Too many failed attempts ({attempts}) for [{url}]: {body}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        body: String,
    },

    #[error("Invalid page count header '{header}': {value:?}")]
    PageCount { header: String, value: String },

    #[error("Unexpected status code {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    #[error("Response processors failed: {}", messages.join("; "))]
    ResponseProcessors { messages: Vec<String> },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an XML error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::XmlParse {
            message: message.into(),
        }
    }

    /// Attach the last rejected response body to a transport failure
    pub fn transport(source: reqwest::Error, diagnostic: Option<String>) -> Self {
        match diagnostic {
            Some(diagnostic) => Self::HttpAfterRejection { diagnostic, source },
            None => Self::Http(source),
        }
    }

    /// Check if the pipeline would retry the condition behind this error.
    ///
    /// Only 400 (retry wrapper) and 429 (throttle wrapper) are ever retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::RetriesExhausted { .. } => Some(400),
            Error::RateLimited { .. } => Some(429),
            Error::Http(e) | Error::HttpAfterRejection { source: e, .. } => {
                e.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }
}

/// Check if an HTTP status code is retried by the wrapper chain
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 400 | 429)
}

/// Result type alias for apimate
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
