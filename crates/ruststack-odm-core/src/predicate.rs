//! Predicates and nested predicate groups.
//!
//! A request's conditions are an ordered list. Each entry is either a single
//! field predicate or a parenthesized group of further conditions; each
//! carries the boolean connector that joins it to the entry before it (the
//! connector of the first entry is never rendered).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expression::{ExpressionError, OperatorKind};

/// Connector joining a condition to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOperator {
    /// Logical AND.
    #[default]
    #[serde(alias = "AND")]
    And,
    /// Logical OR.
    #[serde(alias = "OR")]
    Or,
}

impl BooleanOperator {
    /// Uppercase keyword as rendered in expressions.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field comparison.
///
/// The shape of `value` depends on `kind`: a two-element array for
/// `BETWEEN`, an array for `IN`, ignored for `NULL`/`NOT_NULL`, a single
/// value otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Attribute name or document path.
    pub column: String,
    /// Comparison kind.
    #[serde(rename = "type")]
    pub kind: OperatorKind,
    /// Operand(s).
    #[serde(default)]
    pub value: Value,
    /// Connector to the previous condition.
    #[serde(default)]
    pub boolean: BooleanOperator,
}

impl Predicate {
    /// `AND`-joined predicate.
    #[must_use]
    pub fn new(column: impl Into<String>, kind: OperatorKind, value: Value) -> Self {
        Self {
            column: column.into(),
            kind,
            value,
            boolean: BooleanOperator::And,
        }
    }
}

/// One entry of a condition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Parenthesized group.
    Nested {
        /// Inner conditions.
        #[serde(rename = "nested")]
        conditions: Vec<Condition>,
        /// Connector to the previous condition.
        #[serde(default)]
        boolean: BooleanOperator,
    },
    /// Field predicate.
    Predicate(Predicate),
}

impl Condition {
    /// Field predicate with an explicit kind.
    #[must_use]
    pub fn new(column: impl Into<String>, kind: OperatorKind, value: Value) -> Self {
        Self::Predicate(Predicate::new(column, kind, value))
    }

    /// Field predicate from an operator symbol or canonical name.
    pub fn parse(
        column: impl Into<String>,
        operator: &str,
        value: Value,
    ) -> Result<Self, ExpressionError> {
        Ok(Self::new(column, operator.parse()?, value))
    }

    /// `column = value`
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::Eq, value.into())
    }

    /// `column <> value`
    #[must_use]
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::Ne, value.into())
    }

    /// `column < value`
    #[must_use]
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::Lt, value.into())
    }

    /// `column <= value`
    #[must_use]
    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::Le, value.into())
    }

    /// `column > value`
    #[must_use]
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::Gt, value.into())
    }

    /// `column >= value`
    #[must_use]
    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::Ge, value.into())
    }

    /// `begins_with(column, prefix)`
    #[must_use]
    pub fn begins_with(column: impl Into<String>, prefix: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::BeginsWith, prefix.into())
    }

    /// `column BETWEEN low AND high`
    #[must_use]
    pub fn between(column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::new(
            column,
            OperatorKind::Between,
            Value::Array(vec![low.into(), high.into()]),
        )
    }

    /// `column IN (values...)`
    #[must_use]
    pub fn is_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            column,
            OperatorKind::In,
            Value::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    /// `contains(column, value)`
    #[must_use]
    pub fn contains(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::Contains, value.into())
    }

    /// `NOT contains(column, value)`
    #[must_use]
    pub fn not_contains(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, OperatorKind::NotContains, value.into())
    }

    /// `attribute_not_exists(column)`
    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, OperatorKind::Null, Value::Null)
    }

    /// `attribute_exists(column)`
    #[must_use]
    pub fn not_null(column: impl Into<String>) -> Self {
        Self::new(column, OperatorKind::NotNull, Value::Null)
    }

    /// Parenthesized group.
    #[must_use]
    pub fn nested(conditions: Vec<Condition>) -> Self {
        Self::Nested {
            conditions,
            boolean: BooleanOperator::And,
        }
    }

    /// Join to the previous condition with `OR` instead of `AND`.
    #[must_use]
    pub fn or(self) -> Self {
        self.with_boolean(BooleanOperator::Or)
    }

    /// Replace the connector.
    #[must_use]
    pub fn with_boolean(mut self, op: BooleanOperator) -> Self {
        match &mut self {
            Self::Nested { boolean, .. } => *boolean = op,
            Self::Predicate(p) => p.boolean = op,
        }
        self
    }

    /// Connector to the previous condition.
    #[must_use]
    pub fn boolean(&self) -> BooleanOperator {
        match self {
            Self::Nested { boolean, .. } => *boolean,
            Self::Predicate(p) => p.boolean,
        }
    }

    /// The predicate, unless this is a group.
    #[must_use]
    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            Self::Predicate(p) => Some(p),
            Self::Nested { .. } => None,
        }
    }

    /// Column of a field predicate.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        self.as_predicate().map(|p| p.column.as_str())
    }

    /// Kind of a field predicate.
    #[must_use]
    pub fn kind(&self) -> Option<OperatorKind> {
        self.as_predicate().map(|p| p.kind)
    }
}

impl From<Predicate> for Condition {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

/// Fluent builder for condition lists written with operator symbols.
///
/// The first unknown operator is remembered and reported by
/// [`ConditionBuilder::build`].
///
/// ```
/// use ruststack_odm_core::ConditionBuilder;
/// use serde_json::json;
///
/// let conditions = ConditionBuilder::new()
///     .and("pk", "=", json!("USER#1"))
///     .and("sk", "begins_with", json!("ORDER#"))
///     .build()
///     .unwrap();
/// assert_eq!(conditions.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ConditionBuilder {
    conditions: Vec<Condition>,
    error: Option<ExpressionError>,
}

impl ConditionBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an `AND`-joined predicate.
    #[must_use]
    pub fn and(self, column: &str, operator: &str, value: Value) -> Self {
        self.push(column, operator, value, BooleanOperator::And)
    }

    /// Append an `OR`-joined predicate.
    #[must_use]
    pub fn or(self, column: &str, operator: &str, value: Value) -> Self {
        self.push(column, operator, value, BooleanOperator::Or)
    }

    /// Append a parenthesized group built by `f`.
    #[must_use]
    pub fn group(mut self, boolean: BooleanOperator, f: impl FnOnce(Self) -> Self) -> Self {
        let inner = f(Self::new());
        if self.error.is_none() {
            self.error = inner.error;
        }
        self.conditions
            .push(Condition::nested(inner.conditions).with_boolean(boolean));
        self
    }

    fn push(mut self, column: &str, operator: &str, value: Value, boolean: BooleanOperator) -> Self {
        match Condition::parse(column, operator, value) {
            Ok(c) => self.conditions.push(c.with_boolean(boolean)),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
        self
    }

    /// Finish, failing on the first unknown operator.
    pub fn build(self) -> Result<Vec<Condition>, ExpressionError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.conditions),
        }
    }
}
