//! Page merging and typed decoding
//!
//! A single page is decoded as is. Multiple JSON pages are expected to each
//! hold an array; their elements are concatenated in fetch order before the
//! final decode. Multiple XML pages are folded into one root.

use super::xml::{insert_child, xml_to_json};
use crate::error::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Deserializer, Map, Value};

/// Concatenate page bodies in order
pub fn merge_pages(pages: &[Bytes]) -> Vec<u8> {
    let mut merged = Vec::with_capacity(pages.iter().map(Bytes::len).sum());
    for page in pages {
        merged.extend_from_slice(page);
    }
    merged
}

/// Decode consecutive JSON arrays from one stream and merge their elements
///
/// Returns the merged array re-encoded as JSON.
pub fn merge_json_arrays(raw: &[u8]) -> Result<Vec<u8>> {
    let mut all = Vec::new();
    for page in Deserializer::from_slice(raw).into_iter::<Vec<Value>>() {
        let page = page.map_err(|e| Error::decode(format!("Failed to merge JSON pages: {e}")))?;
        all.extend(page);
    }
    Ok(serde_json::to_vec(&all)?)
}

/// Decode JSON pages into `T`; `None` for an empty page sequence
pub fn decode_json<T: DeserializeOwned>(pages: &[Bytes]) -> Result<Option<T>> {
    let value = match pages {
        [] => return Ok(None),
        [single] => serde_json::from_slice(single),
        _ => {
            let joined = pages.join(&b'\n');
            let merged = merge_json_arrays(&joined)?;
            serde_json::from_slice(&merged)
        }
    };

    value
        .map(Some)
        .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
}

/// Decode XML pages into `T`; `None` for an empty page sequence
///
/// Several pages decode as one document holding the children of every
/// page root in fetch order (see [`merge_xml_roots`]).
pub fn decode_xml<T: DeserializeOwned>(pages: &[Bytes]) -> Result<Option<T>> {
    if pages.is_empty() {
        return Ok(None);
    }

    let mut roots = Vec::with_capacity(pages.len());
    for page in pages {
        roots.push(xml_to_json(&page_text(page)?)?);
    }

    serde_json::from_value(merge_xml_roots(roots))
        .map(Some)
        .map_err(|e| Error::decode(format!("Failed to map XML: {e}")))
}

/// Decode the records of every XML page into one list
///
/// A lone page goes through the same [`xml_records`] extraction as many
/// pages, so the result shape does not depend on the page count.
pub fn decode_xml_records<T: DeserializeOwned>(pages: &[Bytes]) -> Result<Option<Vec<T>>> {
    if pages.is_empty() {
        return Ok(None);
    }

    let mut all = Vec::new();
    for page in pages {
        all.extend(xml_records(xml_to_json(&page_text(page)?)?));
    }

    serde_json::from_value(Value::Array(all))
        .map(Some)
        .map_err(|e| Error::decode(format!("Failed to map XML: {e}")))
}

/// Fold parsed page roots into one root
///
/// Children are appended in page order, and a name seen more than once
/// becomes an array. Root attributes and text are taken from the first page
/// that has them.
pub fn merge_xml_roots(roots: Vec<Value>) -> Value {
    let mut roots = roots.into_iter();
    let Some(mut merged) = roots.next() else {
        return Value::Null;
    };

    for root in roots {
        let Value::Object(fields) = root else {
            continue;
        };
        if let Value::String(text) = &merged {
            let mut wrapped = Map::new();
            if !text.is_empty() {
                wrapped.insert("#text".to_string(), Value::String(text.clone()));
            }
            merged = Value::Object(wrapped);
        }
        let Some(target) = merged.as_object_mut() else {
            continue;
        };

        for (name, value) in fields {
            if name.starts_with('@') || name == "#text" {
                target.entry(name).or_insert(value);
                continue;
            }
            let values = match value {
                Value::Array(items) => items,
                single => vec![single],
            };
            for value in values {
                insert_child(target, &name, value);
            }
        }
    }

    merged
}

/// Records held by one parsed XML page
///
/// A root with exactly one kind of child (`<items><item/><item/></items>`)
/// yields that child's values; any other root is a single record.
pub fn xml_records(root: Value) -> Vec<Value> {
    match root {
        Value::Array(items) => items,
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((_, Value::Array(items))) => items,
            Some((_, item)) => vec![item],
            None => Vec::new(),
        },
        other => vec![other],
    }
}

fn page_text(page: &Bytes) -> Result<String> {
    String::from_utf8(page.to_vec()).map_err(|e| Error::xml(format!("Page is not UTF-8: {e}")))
}
