//! Store-native attribute value.
//!
//! Every value that crosses the store boundary (item attributes, key
//! attributes, expression attribute values) is one of these variants. The
//! JSON wire format is a single-key object such as `{"S": "hello"}`.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire tags, in variant order.
const TAGS: [&str; 10] = ["S", "N", "B", "SS", "NS", "BS", "BOOL", "NULL", "L", "M"];

/// Native attribute value, a tagged union with exactly one variant present.
///
/// Numbers are carried as strings so that precision is never lost between
/// the caller's representation and the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, string-encoded.
    N(String),
    /// Binary; base64 on the wire.
    B(Bytes),
    /// String set.
    Ss(Vec<String>),
    /// Number set.
    Ns(Vec<String>),
    /// Binary set.
    Bs(Vec<Bytes>),
    /// Boolean.
    Bool(bool),
    /// Null marker.
    Null(bool),
    /// Ordered list.
    L(Vec<AttributeValue>),
    /// Nested map.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    fn variant_index(&self) -> u32 {
        match self {
            Self::S(_) => 0,
            Self::N(_) => 1,
            Self::B(_) => 2,
            Self::Ss(_) => 3,
            Self::Ns(_) => 4,
            Self::Bs(_) => 5,
            Self::Bool(_) => 6,
            Self::Null(_) => 7,
            Self::L(_) => 8,
            Self::M(_) => 9,
        }
    }

    /// Wire tag of this value (`"S"`, `"BOOL"`, ...).
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        TAGS[self.variant_index() as usize]
    }

    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        if let Self::S(s) = self { Some(s) } else { None }
    }

    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        if let Self::N(n) = self { Some(n) } else { None }
    }

    #[must_use]
    pub fn as_m(&self) -> Option<&HashMap<String, AttributeValue>> {
        if let Self::M(m) = self { Some(m) } else { None }
    }

    #[must_use]
    pub fn as_l(&self) -> Option<&[AttributeValue]> {
        if let Self::L(l) = self { Some(l) } else { None }
    }

    /// `true` only for `NULL: true`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(true))
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::N(value.to_string())
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const NAME: &str = "AttributeValue";
        let (index, tag) = (self.variant_index(), self.type_descriptor());
        match self {
            Self::S(text) | Self::N(text) => {
                serializer.serialize_newtype_variant(NAME, index, tag, text)
            }
            Self::B(blob) => {
                serializer.serialize_newtype_variant(NAME, index, tag, &BASE64.encode(blob))
            }
            Self::Ss(set) | Self::Ns(set) => {
                serializer.serialize_newtype_variant(NAME, index, tag, set)
            }
            Self::Bs(blobs) => {
                let encoded: Vec<String> = blobs.iter().map(|b| BASE64.encode(b)).collect();
                serializer.serialize_newtype_variant(NAME, index, tag, &encoded)
            }
            Self::Bool(flag) | Self::Null(flag) => {
                serializer.serialize_newtype_variant(NAME, index, tag, flag)
            }
            Self::L(list) => serializer.serialize_newtype_variant(NAME, index, tag, list),
            Self::M(map) => serializer.serialize_newtype_variant(NAME, index, tag, map),
        }
    }
}

/// Owned wire form; binary members are still base64 text here.
#[derive(Deserialize)]
enum Wire {
    S(String),
    N(String),
    B(String),
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    #[serde(rename = "BS")]
    Bs(Vec<String>),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(Vec<AttributeValue>),
    M(HashMap<String, AttributeValue>),
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let decode = |text: &str| BASE64.decode(text).map(Bytes::from).map_err(D::Error::custom);
        Ok(match Wire::deserialize(deserializer)? {
            Wire::S(s) => Self::S(s),
            Wire::N(n) => Self::N(n),
            Wire::B(b) => Self::B(decode(b.as_str())?),
            Wire::Ss(set) => Self::Ss(set),
            Wire::Ns(set) => Self::Ns(set),
            Wire::Bs(set) => Self::Bs(
                set.iter()
                    .map(|b| decode(b.as_str()))
                    .collect::<Result<_, _>>()?,
            ),
            Wire::Bool(flag) => Self::Bool(flag),
            Wire::Null(flag) => Self::Null(flag),
            Wire::L(list) => Self::L(list),
            Wire::M(map) => Self::M(map),
        })
    }
}
