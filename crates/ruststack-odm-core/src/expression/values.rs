//! Expression attribute value table.

use std::collections::HashMap;

use ruststack_odm_model::AttributeValue;

/// Default value placeholder prefix.
pub const DEFAULT_VALUE_PREFIX: &str = ":";

/// Value placeholder table for one compilation pass.
///
/// Stores values that are already marshaled; entries are keyed by
/// placeholder, so two placeholders bound to equal values stay distinct.
#[derive(Debug, Clone)]
pub struct AttributeValues {
    prefix: String,
    values: HashMap<String, AttributeValue>,
    order: Vec<String>,
}

impl Default for AttributeValues {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_VALUE_PREFIX)
    }
}

impl AttributeValues {
    /// Empty table using the `:` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table using a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            values: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Bind `value` to `:<name>`. Rebinding a name replaces its value.
    pub fn set(&mut self, name: &str, value: AttributeValue) {
        let key = format!("{}{name}", self.prefix);
        if self.values.insert(key.clone(), value).is_none() {
            self.order.push(key);
        }
    }

    /// Whether `:<name>` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&format!("{}{name}", self.prefix))
    }

    /// `:<name>` when bound, otherwise `name` verbatim.
    #[must_use]
    pub fn placeholder(&self, name: &str) -> String {
        let candidate = format!("{}{name}", self.prefix);
        if self.values.contains_key(&candidate) {
            candidate
        } else {
            name.to_owned()
        }
    }

    /// Placeholder -> value map, ready for `ExpressionAttributeValues`.
    #[must_use]
    pub fn all(&self) -> &HashMap<String, AttributeValue> {
        &self.values
    }

    /// Value bound to a placeholder.
    #[must_use]
    pub fn get(&self, placeholder: &str) -> Option<&AttributeValue> {
        self.values.get(placeholder)
    }

    /// Bound placeholders in binding order.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.order
    }

    /// Number of bound placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop every binding.
    pub fn reset(&mut self) {
        self.values.clear();
        self.order.clear();
    }

    /// Take the placeholder map, leaving the table empty.
    pub(crate) fn take(&mut self) -> HashMap<String, AttributeValue> {
        self.order.clear();
        std::mem::take(&mut self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_bind_under_prefixed_key() {
        let mut values = AttributeValues::new();
        values.set("a1", AttributeValue::S("USER#1".to_owned()));
        assert_eq!(values.placeholder("a1"), ":a1");
        assert_eq!(
            values.get(":a1"),
            Some(&AttributeValue::S("USER#1".to_owned()))
        );
        assert_eq!(values.placeholder("a2"), "a2");
    }

    #[test]
    fn test_should_keep_equal_values_under_distinct_placeholders() {
        let mut values = AttributeValues::new();
        values.set("a1", AttributeValue::N("1".to_owned()));
        values.set("a2", AttributeValue::N("1".to_owned()));
        assert_eq!(values.len(), 2);
        assert_eq!(values.placeholders(), &[":a1", ":a2"]);
    }

    #[test]
    fn test_should_replace_on_rebind() {
        let mut values = AttributeValues::new();
        values.set("name", AttributeValue::S("old".to_owned()));
        values.set("name", AttributeValue::S("new".to_owned()));
        assert_eq!(values.len(), 1);
        assert_eq!(values.all()[":name"], AttributeValue::S("new".to_owned()));
    }

    #[test]
    fn test_should_clear_on_reset() {
        let mut values = AttributeValues::new();
        values.set("a1", AttributeValue::Bool(true));
        values.reset();
        assert!(values.is_empty());
        assert!(values.placeholders().is_empty());
    }
}
