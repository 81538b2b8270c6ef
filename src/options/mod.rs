//! Request options
//!
//! Builders for [`SharedOption`](crate::context::SharedOption) and
//! [`RequestOption`](crate::context::RequestOption) values.
//!
//! - **Request**: payloads, query, headers, cookies, throttle/retry/TLS/paging policy
//! - **Auth**: bearer, custom header, basic, client-credentials token exchange
//! - **Response**: JSON/XML/raw/custom/null receivers, cookie grabber, processors

mod auth;
mod request;
mod response;

pub use auth::{with_basic_auth, with_bearer_auth, with_header_auth, with_token_exchange};
pub use request::{
    with_accepted_errors, with_all_pages, with_auto_retries, with_auto_throttle, with_cookie,
    with_default_request, with_file_payload, with_form_payload, with_header, with_headers,
    with_json_payload, with_payload, with_query, with_status_checker, with_tls_skip_verify,
    with_values,
};
pub use response::{
    with_cookie_grabber, with_custom_receiver, with_json_receiver, with_null_receiver,
    with_raw_receiver, with_response_processor, with_xml_receiver, with_xml_records_receiver,
};

#[cfg(test)]
mod tests;
