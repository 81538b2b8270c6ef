//! Response options: receivers and secondary processors
//!
//! Receivers borrow the caller's target for the duration of the call and
//! write into it once the pages are in. Only the last receiver applied is
//! used; processors accumulate.

use crate::context::{RequestContext, RequestOption, ResponseMeta, SharedOption};
use crate::decode::{decode_json, decode_xml, decode_xml_records, merge_pages};
use crate::error::Result;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;

/// Decode the response as JSON into `target`
///
/// Multiple pages must each be a JSON array; their elements are merged.
/// Sets `Accept: application/json`, and `Content-Type: application/json`
/// unless a payload option already chose a content type.
pub fn with_json_receiver<'a, T>(target: &'a mut T) -> RequestOption<'a>
where
    T: DeserializeOwned + Send,
{
    RequestOption::new(move |ctx: &mut RequestContext<'a>| {
        ctx.set_header(ACCEPT.as_str(), "application/json")?;
        ctx.set_default_header(CONTENT_TYPE.as_str(), "application/json")?;
        ctx.receiver = Box::new(move |pages: &[Bytes]| {
            if let Some(value) = decode_json(pages)? {
                *target = value;
            }
            Ok(())
        });
        Ok(())
    })
}

/// Decode the response as XML into `target`
pub fn with_xml_receiver<'a, T>(target: &'a mut T) -> RequestOption<'a>
where
    T: DeserializeOwned + Send,
{
    RequestOption::new(move |ctx: &mut RequestContext<'a>| {
        ctx.receiver = Box::new(move |pages: &[Bytes]| {
            if let Some(value) = decode_xml(pages)? {
                *target = value;
            }
            Ok(())
        });
        Ok(())
    })
}

/// Decode the records of every XML page into `target`
///
/// Each page root contributes the values of its repeated child, whether the
/// call fetched one page or many.
pub fn with_xml_records_receiver<'a, T>(target: &'a mut Vec<T>) -> RequestOption<'a>
where
    T: DeserializeOwned + Send,
{
    RequestOption::new(move |ctx: &mut RequestContext<'a>| {
        ctx.receiver = Box::new(move |pages: &[Bytes]| {
            if let Some(records) = decode_xml_records(pages)? {
                *target = records;
            }
            Ok(())
        });
        Ok(())
    })
}

/// Copy the concatenated page bytes into `target`
pub fn with_raw_receiver(target: &mut Vec<u8>) -> RequestOption<'_> {
    RequestOption::new(move |ctx| {
        ctx.receiver = Box::new(move |pages: &[Bytes]| {
            *target = merge_pages(pages);
            Ok(())
        });
        Ok(())
    })
}

/// Hand the raw pages to `receiver`
pub fn with_custom_receiver<'a, F>(receiver: F) -> RequestOption<'a>
where
    F: FnOnce(&[Bytes]) -> Result<()> + Send + 'a,
{
    RequestOption::new(move |ctx: &mut RequestContext<'a>| {
        ctx.receiver = Box::new(receiver);
        Ok(())
    })
}

/// Ignore the response body
pub fn with_null_receiver() -> SharedOption {
    SharedOption::new(|ctx| {
        ctx.receiver = Box::new(|_: &[Bytes]| Ok(()));
        Ok(())
    })
}

/// Store the value of cookie `name` into `target` when the server sets it
pub fn with_cookie_grabber<'a>(name: impl Into<String>, target: &'a mut String) -> RequestOption<'a> {
    let name = name.into();
    with_response_processor(move |meta: &ResponseMeta| {
        if let Some(cookie) = meta.cookie(&name) {
            target.clone_from(&cookie.value);
        }
        Ok(())
    })
}

/// Run `processor` against the final response
pub fn with_response_processor<'a, F>(processor: F) -> RequestOption<'a>
where
    F: FnOnce(&ResponseMeta) -> Result<()> + Send + 'a,
{
    RequestOption::new(move |ctx: &mut RequestContext<'a>| {
        ctx.response_processors.push(Box::new(processor));
        Ok(())
    })
}
