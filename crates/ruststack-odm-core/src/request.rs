//! Native request assembly and finalization.
//!
//! [`QueryRequest`] accumulates native request fields keyed by their wire
//! names. [`QueryRequest::finalize`] strips empty fields into a
//! [`FinalizedRequest`], which can be deserialized into a typed input or
//! handed to a [`StoreClient`] through [`FinalizedRequest::prepare`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use ruststack_odm_model::{AttributeValue, ReturnValue, Select};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{ExecutableRequest, StoreClient};
use crate::error::{OdmError, OdmResult};

macro_rules! request_fields {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)+) => {
        /// Native request field names.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum RequestField {
            $($(#[$doc])* $variant,)+
        }

        impl RequestField {
            /// Every known field.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Wire name.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Field for an exact, case-sensitive wire name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

request_fields! {
    /// `TableName`
    TableName => "TableName",
    /// `IndexName`
    IndexName => "IndexName",
    /// `Key`
    Key => "Key",
    /// `Item`
    Item => "Item",
    /// `RequestItems`
    RequestItems => "RequestItems",
    /// `KeyConditionExpression`
    KeyConditionExpression => "KeyConditionExpression",
    /// `FilterExpression`
    FilterExpression => "FilterExpression",
    /// `ConditionExpression`
    ConditionExpression => "ConditionExpression",
    /// `UpdateExpression`
    UpdateExpression => "UpdateExpression",
    /// `ProjectionExpression`
    ProjectionExpression => "ProjectionExpression",
    /// `ExpressionAttributeNames`
    ExpressionAttributeNames => "ExpressionAttributeNames",
    /// `ExpressionAttributeValues`
    ExpressionAttributeValues => "ExpressionAttributeValues",
    /// `Limit`
    Limit => "Limit",
    /// `Select`
    Select => "Select",
    /// `ConsistentRead`
    ConsistentRead => "ConsistentRead",
    /// `ExclusiveStartKey`
    ExclusiveStartKey => "ExclusiveStartKey",
    /// `ScanIndexForward`
    ScanIndexForward => "ScanIndexForward",
    /// `ReturnValues`
    ReturnValues => "ReturnValues",
    /// `Segment`
    Segment => "Segment",
    /// `TotalSegments`
    TotalSegments => "TotalSegments",
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Falsy: null, `false`, zero, or an empty string, array or object.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        other => is_empty(other),
    }
}

/// Empty: null, or an empty string, array or object. Booleans and numbers
/// are never empty.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn to_object<T: Serialize>(map: &T) -> OdmResult<Value> {
    Ok(serde_json::to_value(map)?)
}

/// Native request under construction.
///
/// `set` and `set_field` always store the value. The `set_*` helpers skip
/// falsy values, so optional settings that were never given stay out of the
/// request; store explicit `false` or `0` through [`QueryRequest::set`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    fields: BTreeMap<RequestField, Value>,
}

impl QueryRequest {
    /// Empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request targeting `table`.
    #[must_use]
    pub fn for_table(table: &str) -> Self {
        let mut request = Self::new();
        request.set_table_name(table);
        request
    }

    /// Store a field value.
    pub fn set(&mut self, field: RequestField, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Store a field value by wire name.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> OdmResult<&mut Self> {
        let field =
            RequestField::from_name(name).ok_or_else(|| OdmError::UnknownRequestField(name.to_owned()))?;
        Ok(self.set(field, value))
    }

    fn set_truthy(&mut self, field: RequestField, value: Value) -> &mut Self {
        if !is_falsy(&value) {
            self.fields.insert(field, value);
        }
        self
    }

    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: RequestField) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// Drop a field.
    pub fn remove(&mut self, field: RequestField) -> Option<Value> {
        self.fields.remove(&field)
    }

    /// Number of fields set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // -- Field setters; each skips falsy values --

    pub fn set_table_name(&mut self, table: &str) -> &mut Self {
        self.set_truthy(RequestField::TableName, table.into())
    }

    pub fn set_index_name(&mut self, index: &str) -> &mut Self {
        self.set_truthy(RequestField::IndexName, index.into())
    }

    pub fn set_limit(&mut self, limit: u32) -> &mut Self {
        self.set_truthy(RequestField::Limit, limit.into())
    }

    pub fn set_select(&mut self, select: Select) -> &mut Self {
        self.set_truthy(RequestField::Select, select.as_str().into())
    }

    pub fn set_consistent_read(&mut self, consistent: bool) -> &mut Self {
        self.set_truthy(RequestField::ConsistentRead, consistent.into())
    }

    pub fn set_scan_index_forward(&mut self, forward: bool) -> &mut Self {
        self.set_truthy(RequestField::ScanIndexForward, forward.into())
    }

    pub fn set_return_values(&mut self, mode: ReturnValue) -> &mut Self {
        self.set_truthy(RequestField::ReturnValues, mode.as_str().into())
    }

    pub fn set_key_condition_expression(&mut self, expression: &str) -> &mut Self {
        self.set_truthy(RequestField::KeyConditionExpression, expression.into())
    }

    pub fn set_filter_expression(&mut self, expression: &str) -> &mut Self {
        self.set_truthy(RequestField::FilterExpression, expression.into())
    }

    pub fn set_condition_expression(&mut self, expression: &str) -> &mut Self {
        self.set_truthy(RequestField::ConditionExpression, expression.into())
    }

    pub fn set_update_expression(&mut self, expression: &str) -> &mut Self {
        self.set_truthy(RequestField::UpdateExpression, expression.into())
    }

    pub fn set_projection_expression(&mut self, expression: &str) -> &mut Self {
        self.set_truthy(RequestField::ProjectionExpression, expression.into())
    }

    pub fn set_expression_attribute_names(
        &mut self,
        names: HashMap<String, String>,
    ) -> &mut Self {
        let object: Map<String, Value> = names.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
        self.set_truthy(RequestField::ExpressionAttributeNames, Value::Object(object))
    }

    pub fn set_expression_attribute_values(
        &mut self,
        values: &HashMap<String, AttributeValue>,
    ) -> OdmResult<&mut Self> {
        let value = to_object(values)?;
        Ok(self.set_truthy(RequestField::ExpressionAttributeValues, value))
    }

    pub fn set_key(&mut self, key: &HashMap<String, AttributeValue>) -> OdmResult<&mut Self> {
        let value = to_object(key)?;
        Ok(self.set_truthy(RequestField::Key, value))
    }

    pub fn set_item(&mut self, item: &HashMap<String, AttributeValue>) -> OdmResult<&mut Self> {
        let value = to_object(item)?;
        Ok(self.set_truthy(RequestField::Item, value))
    }

    pub fn set_exclusive_start_key(
        &mut self,
        key: &HashMap<String, AttributeValue>,
    ) -> OdmResult<&mut Self> {
        let value = to_object(key)?;
        Ok(self.set_truthy(RequestField::ExclusiveStartKey, value))
    }

    /// Copy both attribute maps out of a compiled pair.
    pub fn set_attribute_maps(
        &mut self,
        (names, values): (HashMap<String, String>, HashMap<String, AttributeValue>),
    ) -> OdmResult<&mut Self> {
        self.set_expression_attribute_names(names);
        self.set_expression_attribute_values(&values)
    }

    /// Wire-ready copy with every empty field removed. Booleans and numbers
    /// are always kept, so `false` and `0` survive.
    #[must_use]
    pub fn finalize(&self) -> FinalizedRequest {
        let mut fields = BTreeMap::new();
        let mut dropped = Vec::new();
        for (field, value) in &self.fields {
            if is_empty(value) {
                dropped.push(field.as_str());
            } else {
                fields.insert(*field, value.clone());
            }
        }
        debug!(kept = fields.len(), ?dropped, "finalized request");
        FinalizedRequest { fields }
    }
}

impl From<FinalizedRequest> for QueryRequest {
    fn from(request: FinalizedRequest) -> Self {
        Self {
            fields: request.fields,
        }
    }
}

/// Request payload with empty fields removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalizedRequest {
    fields: BTreeMap<RequestField, Value>,
}

impl FinalizedRequest {
    /// Field value.
    #[must_use]
    pub fn get(&self, field: RequestField) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// String field value.
    #[must_use]
    pub fn get_str(&self, field: RequestField) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Target table, if set.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.get_str(RequestField::TableName)
    }

    /// Field names in payload order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().map(RequestField::as_str)
    }

    /// Payload as a JSON object keyed by wire name.
    #[must_use]
    pub fn as_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(field, value)| (field.as_str().to_owned(), value.clone()))
            .collect()
    }

    /// Deserialize the payload into a typed request input.
    pub fn into_input<T: DeserializeOwned>(&self) -> OdmResult<T> {
        Ok(serde_json::from_value(Value::Object(self.as_map()))?)
    }

    /// Bind the payload to a client.
    #[must_use]
    pub fn prepare<C: StoreClient + ?Sized>(self, client: &C) -> ExecutableRequest<'_, C> {
        ExecutableRequest::new(self, client)
    }
}

impl Serialize for FinalizedRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use ruststack_odm_model::input::QueryInput;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_skip_falsy_values_in_setters() {
        let mut request = QueryRequest::new();
        request
            .set_table_name("")
            .set_index_name("")
            .set_limit(0)
            .set_consistent_read(false)
            .set_scan_index_forward(false)
            .set_filter_expression("");
        request.set_expression_attribute_names(HashMap::new());
        assert!(request.is_empty());

        request.set_limit(25).set_consistent_read(true);
        assert_eq!(request.get(RequestField::Limit), Some(&json!(25)));
        assert_eq!(request.get(RequestField::ConsistentRead), Some(&json!(true)));
    }

    #[test]
    fn test_should_set_any_value_through_generic_setter() {
        let mut request = QueryRequest::new();
        request.set(RequestField::ScanIndexForward, false);
        request.set_field("Limit", 0).unwrap();
        assert_eq!(request.len(), 2);
    }

    #[test]
    fn test_should_reject_unknown_field_name() {
        let mut request = QueryRequest::new();
        let err = request.set_field("tableName", "orders").unwrap_err();
        assert!(matches!(err, OdmError::UnknownRequestField(ref name) if name == "tableName"));
    }

    #[test]
    fn test_should_map_every_field_name() {
        for field in RequestField::ALL {
            assert_eq!(RequestField::from_name(field.as_str()), Some(*field));
        }
    }

    #[test]
    fn test_should_drop_empty_but_keep_false_and_zero() {
        let mut request = QueryRequest::for_table("orders");
        request
            .set(RequestField::ConsistentRead, false)
            .set(RequestField::Limit, 0)
            .set(RequestField::FilterExpression, "")
            .set(RequestField::ExpressionAttributeNames, json!({}))
            .set(RequestField::ExclusiveStartKey, Value::Null)
            .set(RequestField::ProjectionExpression, json!([]));

        let finalized = request.finalize();
        assert_eq!(
            serde_json::to_value(&finalized).unwrap(),
            json!({"TableName": "orders", "Limit": 0, "ConsistentRead": false})
        );
    }

    #[test]
    fn test_should_finalize_idempotently() {
        let mut request = QueryRequest::for_table("orders");
        request
            .set(RequestField::ScanIndexForward, false)
            .set(RequestField::FilterExpression, "");
        let once = request.finalize();
        let twice = QueryRequest::from(once.clone()).finalize();
        assert_eq!(once, twice);
        assert_eq!(request.finalize(), once);
    }

    #[test]
    fn test_should_convert_into_typed_input() {
        let mut values = HashMap::new();
        values.insert(":a1".to_owned(), AttributeValue::S("USER#1".to_owned()));
        let mut names = HashMap::new();
        names.insert("#pk".to_owned(), "pk".to_owned());

        let mut request = QueryRequest::for_table("orders");
        request
            .set_key_condition_expression("#pk = :a1")
            .set_limit(10)
            .set(RequestField::ScanIndexForward, false);
        request.set_attribute_maps((names, values)).unwrap();

        let input: QueryInput = request.finalize().into_input().unwrap();
        assert_eq!(input.table_name, "orders");
        assert_eq!(input.key_condition_expression.as_deref(), Some("#pk = :a1"));
        assert_eq!(input.limit, Some(10));
        assert_eq!(input.scan_index_forward, Some(false));
        assert_eq!(input.expression_attribute_names["#pk"], "pk");
        assert_eq!(
            input.expression_attribute_values[":a1"],
            AttributeValue::S("USER#1".to_owned())
        );
    }
}
