//! XML to JSON conversion
//!
//! XML pages are mapped onto `serde_json::Value` so that callers decode them
//! with the same serde types they use for JSON:
//!
//! - the root element's name is dropped, its content becomes the value
//! - child elements become object fields; repeated children become arrays
//! - attributes become `@name` fields
//! - text-only elements become strings (XML text carries no type)
//! - text next to attributes or children is kept under `#text`

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Parse an XML document into a JSON value
pub fn xml_to_json(xml: &str) -> Result<Value> {
    let mut parser = Parser::new(xml);
    parser.skip_misc()?;

    if !parser.rest().starts_with('<') {
        return Err(Error::xml("Input does not appear to be XML"));
    }

    let (_, value) = parser.element()?;

    parser.skip_misc()?;
    if !parser.rest().is_empty() {
        return Err(Error::xml("Unexpected content after root element"));
    }

    Ok(value)
}

struct Parser<'s> {
    input: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(input: &'s str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'s str {
        &self.input[self.pos..]
    }

    fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.advance(rest.len() - rest.trim_start().len());
    }

    /// Skip past `terminator`, failing if it never appears
    fn skip_past(&mut self, terminator: &str, what: &str) -> Result<&'s str> {
        let rest = self.rest();
        let end = rest
            .find(terminator)
            .ok_or_else(|| Error::xml(format!("Unterminated {what}")))?;
        self.advance(end + terminator.len());
        Ok(&rest[..end])
    }

    /// Skip whitespace, declarations, comments and doctype
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_ws();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>", "processing instruction")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->", "comment")?;
            } else if rest.starts_with("<!DOCTYPE") {
                self.skip_past(">", "doctype")?;
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<&'s str> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '='))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(Error::xml("Expected a name"));
        }
        self.advance(end);
        Ok(&rest[..end])
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.rest().starts_with(token) {
            self.advance(token.len());
            Ok(())
        } else {
            Err(Error::xml(format!("Expected '{token}'")))
        }
    }

    /// Parse one element starting at `<`
    fn element(&mut self) -> Result<(&'s str, Value)> {
        self.expect("<")?;
        let name = self.name()?;

        let mut fields = Map::new();
        loop {
            self.skip_ws();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.advance(2);
                return Ok((name, build_value(fields, String::new())));
            }
            if rest.starts_with('>') {
                self.advance(1);
                break;
            }
            let (key, value) = self.attribute()?;
            fields.insert(format!("@{key}"), Value::String(value));
        }

        let mut text = String::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(Error::xml(format!("Missing closing tag for {name}")));
            }

            if rest.starts_with("</") {
                self.advance(2);
                let closing = self.name()?;
                if closing != name {
                    return Err(Error::xml(format!(
                        "Mismatched closing tag: expected </{name}>, found </{closing}>"
                    )));
                }
                self.skip_ws();
                self.expect(">")?;
                return Ok((name, build_value(fields, text)));
            }

            if rest.starts_with("<!--") {
                self.skip_past("-->", "comment")?;
            } else if rest.starts_with("<![CDATA[") {
                self.advance("<![CDATA[".len());
                text.push_str(self.skip_past("]]>", "CDATA section")?);
            } else if rest.starts_with("<?") {
                self.skip_past("?>", "processing instruction")?;
            } else if rest.starts_with('<') {
                let (child, value) = self.element()?;
                insert_child(&mut fields, child, value);
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                text.push_str(&decode_entities(&rest[..end]));
                self.advance(end);
            }
        }
    }

    fn attribute(&mut self) -> Result<(&'s str, String)> {
        let key = self.name()?;
        self.skip_ws();
        self.expect("=")?;
        self.skip_ws();

        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(Error::xml(format!("Unquoted value for attribute {key}"))),
        };
        self.advance(1);
        let raw = self.skip_past(&quote.to_string(), "attribute value")?;
        Ok((key, decode_entities(raw)))
    }
}

pub(super) fn insert_child(fields: &mut Map<String, Value>, name: &str, value: Value) {
    match fields.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name.to_string(), value);
        }
    }
}

fn build_value(mut fields: Map<String, Value>, text: String) -> Value {
    let text = text.trim();
    if fields.is_empty() {
        return Value::String(text.to_string());
    }
    if !text.is_empty() {
        fields.insert("#text".to_string(), Value::String(text.to_string()));
    }
    Value::Object(fields)
}

/// Replace the predefined and numeric character references
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = rest.find(';') else {
            break;
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod xml_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_self_closing_child_does_not_swallow_parent() {
        let value = xml_to_json("<r><empty/><name>x</name></r>").unwrap();
        assert_eq!(value, json!({"empty": "", "name": "x"}));
    }

    #[test]
    fn test_nested_same_name() {
        let value = xml_to_json("<a><a>inner</a></a>").unwrap();
        assert_eq!(value, json!({"a": "inner"}));
    }
}
