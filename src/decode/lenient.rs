//! Lenient scalar types
//!
//! Some APIs send booleans and integers as strings in one response and as
//! native JSON values in the next. These wrappers accept both.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A boolean that also accepts `"true"`, `"FALSE"`, `"1"`, `"0"`, `"t"`, `"f"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct JsonBool(pub bool);

impl JsonBool {
    pub fn get(self) -> bool {
        self.0
    }
}

impl From<JsonBool> for bool {
    fn from(value: JsonBool) -> Self {
        value.0
    }
}

impl Serialize for JsonBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

impl<'de> Deserialize<'de> for JsonBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BoolVisitor;

        impl Visitor<'_> for BoolVisitor {
            type Value = JsonBool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or a boolean string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonBool, E> {
                Ok(JsonBool(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonBool, E> {
                match v.trim().to_lowercase().as_str() {
                    "true" | "t" | "1" => Ok(JsonBool(true)),
                    "false" | "f" | "0" => Ok(JsonBool(false)),
                    _ => Err(E::custom(format!("invalid boolean string: {v:?}"))),
                }
            }
        }

        deserializer.deserialize_any(BoolVisitor)
    }
}

/// A 64-bit integer that also accepts numeric strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonInt64(pub i64);

impl JsonInt64 {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<JsonInt64> for i64 {
    fn from(value: JsonInt64) -> Self {
        value.0
    }
}

impl Serialize for JsonInt64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for JsonInt64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IntVisitor;

        impl Visitor<'_> for IntVisitor {
            type Value = JsonInt64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or an integer string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonInt64, E> {
                Ok(JsonInt64(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonInt64, E> {
                i64::try_from(v)
                    .map(JsonInt64)
                    .map_err(|_| E::custom(format!("integer out of range: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonInt64, E> {
                v.trim()
                    .parse()
                    .map(JsonInt64)
                    .map_err(|_| E::custom(format!("invalid int64 string: {v:?}")))
            }
        }

        deserializer.deserialize_any(IntVisitor)
    }
}
