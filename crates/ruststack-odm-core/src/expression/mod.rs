//! Expression compilation.
//!
//! Turns predicates, attribute maps and column lists into native expression
//! strings. One [`ExpressionState`] holds everything a single compilation
//! pass shares: the value placeholder allocator, the name table and the
//! value table. Compilers borrow the state mutably, so the key-condition,
//! filter, update and projection compilers of one request all write into the
//! same placeholder namespace and never into another request's.
//!
//! ```text
//! conditions ──► ConditionCompiler ─┐
//! attributes ──► UpdateCompiler    ─┼──► ExpressionState ──► names / values maps
//! columns    ──► ProjectionCompiler ┘
//! ```

pub mod condition;
pub mod names;
pub mod operator;
pub mod placeholder;
pub mod projection;
pub mod update;
pub mod values;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ruststack_odm_model::{AttributeValue, MarshalError, Marshaler, ValueMarshaler};
use serde_json::Value;

pub use condition::{ConditionCompiler, ConditionRole};
pub use names::{AttributeNames, PathElement};
pub use operator::OperatorKind;
pub use placeholder::PlaceholderAllocator;
pub use projection::ProjectionCompiler;
pub use update::UpdateCompiler;
pub use values::AttributeValues;

use crate::config::OdmConfig;

/// Errors raised while compiling expressions.
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    /// The operator is unknown, or not allowed where it was used.
    #[error("Unsupported operator in {context}: {operator}")]
    UnsupportedOperator {
        /// Symbol or kind name as given.
        operator: String,
        /// Where the lookup happened.
        context: &'static str,
    },
    /// The predicate value does not have the shape its kind needs.
    #[error("Malformed {kind} predicate on {column}: {message}")]
    MalformedPredicate {
        /// Column of the offending predicate.
        column: String,
        /// Kind of the offending predicate.
        kind: OperatorKind,
        /// What is wrong with the value.
        message: String,
    },
    /// A value could not be marshaled.
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

impl ExpressionError {
    /// Unknown symbol or kind name.
    #[must_use]
    pub fn unknown_operator(operator: &str) -> Self {
        Self::UnsupportedOperator {
            operator: operator.to_owned(),
            context: "operator catalog",
        }
    }

    /// Kind not allowed in a key condition.
    #[must_use]
    pub fn not_key_capable(kind: OperatorKind) -> Self {
        Self::UnsupportedOperator {
            operator: kind.as_str().to_owned(),
            context: "key condition",
        }
    }

    pub(crate) fn malformed(column: &str, kind: OperatorKind, message: impl Into<String>) -> Self {
        Self::MalformedPredicate {
            column: column.to_owned(),
            kind,
            message: message.into(),
        }
    }
}

/// Placeholder allocator, name table and value table of one compilation
/// pass, plus the codec used to marshal bound values.
///
/// Build a fresh state per request. Reusing one across requests carries its
/// counter and maps over into the next request.
pub struct ExpressionState {
    placeholders: PlaceholderAllocator,
    names: AttributeNames,
    values: AttributeValues,
    marshaler: Arc<dyn ValueMarshaler>,
}

impl fmt::Debug for ExpressionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionState")
            .field("placeholders", &self.placeholders)
            .field("names", &self.names)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl Default for ExpressionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionState {
    /// State with the default prefixes and the JSON marshaler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            placeholders: PlaceholderAllocator::new(),
            names: AttributeNames::new(),
            values: AttributeValues::new(),
            marshaler: Arc::new(Marshaler),
        }
    }

    /// State using the prefixes from `config`.
    #[must_use]
    pub fn from_config(config: &OdmConfig) -> Self {
        Self {
            placeholders: PlaceholderAllocator::with_prefix(config.placeholder_prefix.as_str()),
            names: AttributeNames::with_prefix(config.name_prefix.as_str()),
            values: AttributeValues::with_prefix(config.value_prefix.as_str()),
            marshaler: Arc::new(Marshaler),
        }
    }

    /// Replace the value codec.
    #[must_use]
    pub fn with_marshaler(mut self, marshaler: Arc<dyn ValueMarshaler>) -> Self {
        self.marshaler = marshaler;
        self
    }

    /// Compiler for a key-condition expression.
    pub fn key_conditions(&mut self) -> ConditionCompiler<'_> {
        ConditionCompiler::new(self, ConditionRole::Key)
    }

    /// Compiler for a filter or condition expression.
    pub fn filter(&mut self) -> ConditionCompiler<'_> {
        ConditionCompiler::new(self, ConditionRole::Filter)
    }

    /// Compiler for update expressions.
    pub fn update(&mut self) -> UpdateCompiler<'_> {
        UpdateCompiler::new(self)
    }

    /// Compiler for projection expressions.
    pub fn projection(&mut self) -> ProjectionCompiler<'_> {
        ProjectionCompiler::new(self)
    }

    /// Name table.
    #[must_use]
    pub fn names(&self) -> &AttributeNames {
        &self.names
    }

    /// Value table.
    #[must_use]
    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Value codec.
    #[must_use]
    pub fn marshaler(&self) -> &dyn ValueMarshaler {
        self.marshaler.as_ref()
    }

    /// Value placeholders handed out so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.placeholders.allocated()
    }

    /// Reset the allocator and both tables together.
    pub fn reset(&mut self) {
        self.placeholders.reset();
        self.names.reset();
        self.values.reset();
    }

    /// Hand the name and value maps over to a request, leaving the state
    /// empty and the counter at zero.
    pub fn take_attribute_maps(
        &mut self,
    ) -> (HashMap<String, String>, HashMap<String, AttributeValue>) {
        self.placeholders.reset();
        (self.names.take(), self.values.take())
    }

    /// Consume the state, returning its name and value maps.
    #[must_use]
    pub fn into_attribute_maps(
        mut self,
    ) -> (HashMap<String, String>, HashMap<String, AttributeValue>) {
        self.take_attribute_maps()
    }

    pub(crate) fn register_name(&mut self, name: &str) -> String {
        self.names.set(name);
        self.names.placeholder(name)
    }

    /// Allocate a fresh placeholder, bind the marshaled value to it and
    /// return its `:` form.
    ///
    /// Tokens already bound under a caller-chosen key are skipped.
    pub(crate) fn bind_value(&mut self, value: &Value) -> Result<String, ExpressionError> {
        let token = loop {
            let token = self.placeholders.next();
            if !self.values.contains(&token) {
                break token;
            }
        };
        self.bind_value_as(&token, value)
    }

    /// Bind the marshaled value under `key`, or under `key_2`, `key_3`, ...
    /// when `key` is already bound. Existing bindings are never replaced.
    pub(crate) fn bind_value_as(
        &mut self,
        key: &str,
        value: &Value,
    ) -> Result<String, ExpressionError> {
        let marshaled = self.marshaler.marshal_value(value)?;
        let mut candidate = key.to_owned();
        let mut suffix = 1;
        while self.values.contains(&candidate) {
            suffix += 1;
            candidate = format!("{key}_{suffix}");
        }
        self.values.set(&candidate, marshaled);
        Ok(self.values.placeholder(&candidate))
    }
}
