//! Pagination module
//!
//! Supports page-number pagination where the server reports the total page
//! count in a response header (e.g. `?page=N` / `X-Total-Pages`).
//!
//! # Overview
//!
//! The loop stops when the header is missing or the current page reaches the
//! reported total. A header that is not an integer fails the call.

mod pager;

pub use pager::{consume, set_query_param, Pages, FIRST_PAGE};
