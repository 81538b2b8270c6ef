//! Response decoding module
//!
//! Supports: raw bytes, JSON, XML
//!
//! # Overview
//!
//! Receivers hand the ordered page bodies of a call to these functions.
//! Multi-page JSON responses are merged into a single array before the final
//! decode. Multi-page XML is merged into one document, or flattened into one
//! record list by [`decode_xml_records`]. An empty page sequence always
//! decodes to nothing.

mod lenient;
mod merge;
mod xml;

pub use lenient::{JsonBool, JsonInt64};
pub use merge::{
    decode_json, decode_xml, decode_xml_records, merge_json_arrays, merge_pages, merge_xml_roots,
    xml_records,
};
pub use xml::xml_to_json;
