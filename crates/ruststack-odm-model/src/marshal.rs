//! Value marshaling codec.
//!
//! Converts plain JSON values (what callers put into predicates, keys and
//! items) into native [`AttributeValue`]s and back. Expression compilation
//! only ever stores marshaled values, so this is the single point where the
//! caller's representation meets the store's.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::attribute_value::AttributeValue;

/// Errors produced while marshaling or unmarshaling values.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// A number string could not be turned back into a JSON number.
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// Codec between caller values and native attribute values.
///
/// The default [`Marshaler`] covers JSON. Callers with their own document
/// representation can plug in a different implementation.
pub trait ValueMarshaler: Send + Sync {
    /// Marshal a single value.
    fn marshal_value(&self, value: &Value) -> Result<AttributeValue, MarshalError>;

    /// Unmarshal a single native value.
    fn unmarshal_value(&self, value: &AttributeValue) -> Result<Value, MarshalError>;

    /// Marshal a JSON object into a native item map.
    fn marshal_item(
        &self,
        item: &Map<String, Value>,
    ) -> Result<HashMap<String, AttributeValue>, MarshalError> {
        item.iter()
            .map(|(k, v)| Ok((k.clone(), self.marshal_value(v)?)))
            .collect()
    }

    /// Unmarshal a native item map into a JSON object.
    fn unmarshal_item(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> Result<Map<String, Value>, MarshalError> {
        item.iter()
            .map(|(k, v)| Ok((k.clone(), self.unmarshal_value(v)?)))
            .collect()
    }
}

/// Default JSON marshaler.
///
/// | JSON    | native |
/// |---------|--------|
/// | string  | `S`    |
/// | number  | `N`    |
/// | bool    | `BOOL` |
/// | null    | `NULL` |
/// | array   | `L`    |
/// | object  | `M`    |
///
/// Sets unmarshal to arrays; binaries unmarshal to base64 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Marshaler;

impl ValueMarshaler for Marshaler {
    fn marshal_value(&self, value: &Value) -> Result<AttributeValue, MarshalError> {
        Ok(match value {
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Null => AttributeValue::Null(true),
            Value::Array(items) => AttributeValue::L(
                items
                    .iter()
                    .map(|v| self.marshal_value(v))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => AttributeValue::M(self.marshal_item(map)?),
        })
    }

    fn unmarshal_value(&self, value: &AttributeValue) -> Result<Value, MarshalError> {
        use base64::Engine;

        Ok(match value {
            AttributeValue::S(s) => Value::String(s.clone()),
            AttributeValue::N(n) => Value::Number(parse_number(n)?),
            AttributeValue::B(b) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            AttributeValue::Ss(v) => Value::Array(v.iter().cloned().map(Value::String).collect()),
            AttributeValue::Ns(v) => Value::Array(
                v.iter()
                    .map(|n| parse_number(n).map(Value::Number))
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::Bs(v) => Value::Array(
                v.iter()
                    .map(|b| Value::String(base64::engine::general_purpose::STANDARD.encode(b)))
                    .collect(),
            ),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::L(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.unmarshal_value(v))
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::M(map) => Value::Object(self.unmarshal_item(map)?),
        })
    }
}

fn parse_number(s: &str) -> Result<Number, MarshalError> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Ok(Number::from(u));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| MarshalError::InvalidNumber(s.to_owned()))
}
