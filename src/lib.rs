// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # apimate
//!
//! A declarative HTTP request pipeline. A call is described by composable
//! options (payload, auth, headers, receiver, pagination, accepted errors)
//! and executed with 429 backoff, 400 retry and page aggregation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apimate::options::{with_bearer_auth, with_json_receiver, with_all_pages};
//! use apimate::{ApiClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ApiClient::new("https://api.example.com/v1", vec![with_bearer_auth("token")])?;
//!
//!     let mut users: Vec<serde_json::Value> = Vec::new();
//!     client
//!         .get(
//!             "users",
//!             vec![
//!                 with_all_pages("page", "X-Total-Pages").into(),
//!                 with_json_receiver(&mut users),
//!             ],
//!         )
//!         .await?;
//!
//!     println!("{} users", users.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! options ──► RequestContext
//!                  │
//!        ┌─────────┴──────────┐
//!        │  pagination loop   │  page=1..N, X-Total-Pages
//!        │ ┌────────────────┐ │
//!        │ │ Throttle (429) │ │  Retry-After, 3 attempts
//!        │ │ ┌────────────┐ │ │
//!        │ │ │ Retry (400)│ │ │  1s, auto_retries attempts
//!        │ │ │ ┌────────┐ │ │ │
//!        │ │ │ │ Direct │ │ │ │
//!        └─┴─┴─┴────────┴─┴─┴─┘
//!                  │
//!          response processor ──► receiver, processors
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Per-call request context and option composition
pub mod context;

/// Option builders
pub mod options;

/// Client-credentials token exchange
pub mod auth;

/// Throttle and retry wrapper chain
pub mod http;

/// Page-number pagination
pub mod pagination;

/// Response decoding (raw, JSON, XML)
pub mod decode;

/// Status classification and receiver dispatch
pub mod response;

/// API client
pub mod client;

/// Client profiles
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{ApiClient, ApiClientBuilder};
pub use config::{AuthProfile, ClientConfig};
pub use context::{RequestContext, RequestOption, SharedOption};
pub use error::{Error, Result, ResultExt};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
