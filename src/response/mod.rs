//! Response processing module
//!
//! 1. A status accepted by the context's checker succeeds without decoding.
//! 2. Any other status outside 2xx fails with the first page as diagnostic.
//! 3. Otherwise the receiver decodes all pages.
//!
//! Secondary processors (cookie grabbers and the like) run in every case.

mod processor;

pub use processor::{is_error_code, Disposition, ResponseHandler};
