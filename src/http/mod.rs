//! HTTP execution module
//!
//! Provides the wrapper chain every page request goes through.
//!
//! # Features
//!
//! - **Throttle** (outermost): backs off on 429 using `Retry-After`, 3 attempts
//! - **Retry**: resends on 400 after a fixed 1s wait, `auto_retries` attempts
//! - **Direct**: sends one request through reqwest
//!
//! The order is fixed by [`build_chain`]; throttle always sees the result of
//! a whole retry cycle, so a 429 never consumes retry attempts.

mod exchange;
mod retry;
mod sleep;
mod throttle;

pub use exchange::{build_chain, clone_request, ChainPolicy, Direct, Exchange};
pub use retry::{Retry, RETRY_DELAY};
pub use sleep::{RecordingSleeper, Sleeper, TokioSleeper};
pub use throttle::{retry_after_seconds, Throttle, MAX_THROTTLE_ATTEMPTS};
