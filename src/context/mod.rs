//! Request context module
//!
//! A [`RequestContext`] is the mutable record one call is built into. Options
//! mutate it in order; the pipeline then consumes it exactly once.
//!
//! # Overview
//!
//! - [`RequestOption`]: a one-shot mutation, may borrow caller data (receivers)
//! - [`SharedOption`]: a reusable mutation, used for client-level defaults
//! - [`compose`]: applies options left-to-right and stops at the first error

mod options;
mod types;

pub use options::{compose, RequestOption, SharedOption};
pub use types::{
    Cookie, PagingConfig, Receiver, RequestContext, ResponseMeta, ResponseProcessor,
    StatusChecker, DEFAULT_AUTO_RETRIES,
};
