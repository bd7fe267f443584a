//! Key-condition and filter expression compiler.

use ruststack_odm_model::KeyType;
use serde_json::Value;
use tracing::{debug, trace};

use super::{ExpressionError, ExpressionState, OperatorKind};
use crate::predicate::{Condition, Predicate};

/// Which clause a condition list is compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionRole {
    /// `KeyConditionExpression`: only kinds a sort key accepts.
    Key,
    /// `FilterExpression` / `ConditionExpression`: every kind.
    Filter,
}

impl ConditionRole {
    /// Whether `kind` may be rendered in this role.
    #[must_use]
    pub fn accepts(&self, kind: OperatorKind) -> bool {
        match self {
            Self::Key => kind.is_query_capable(KeyType::Range),
            Self::Filter => true,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key condition",
            Self::Filter => "filter",
        }
    }
}

/// Renders an ordered condition list into one boolean expression.
///
/// ```
/// use ruststack_odm_core::{Condition, ExpressionState};
///
/// let mut state = ExpressionState::new();
/// let expr = state
///     .key_conditions()
///     .compile(&[Condition::eq("pk", "USER#1"), Condition::begins_with("sk", "ORDER#")])
///     .unwrap();
/// assert_eq!(expr, "#pk = :a1 AND begins_with(#sk, :a2)");
/// ```
#[derive(Debug)]
pub struct ConditionCompiler<'s> {
    state: &'s mut ExpressionState,
    role: ConditionRole,
}

impl<'s> ConditionCompiler<'s> {
    pub(crate) fn new(state: &'s mut ExpressionState, role: ConditionRole) -> Self {
        Self { state, role }
    }

    /// Role this compiler renders for.
    #[must_use]
    pub fn role(&self) -> ConditionRole {
        self.role
    }

    /// Compile `conditions`. An empty list renders to an empty string.
    ///
    /// Fails on the first predicate whose kind the role does not accept, or
    /// whose value has the wrong shape. Names and values registered before
    /// the failure stay in the state.
    pub fn compile(&mut self, conditions: &[Condition]) -> Result<String, ExpressionError> {
        let expression = self.render(conditions)?;
        debug!(
            role = self.role.as_str(),
            %expression,
            values = self.state.values().len(),
            "compiled condition expression"
        );
        Ok(expression)
    }

    /// Reset the shared allocator and tables.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    fn render(&mut self, conditions: &[Condition]) -> Result<String, ExpressionError> {
        let mut out = String::new();
        for condition in conditions {
            let term = match condition {
                Condition::Nested { conditions, .. } => {
                    let inner = self.render(conditions)?;
                    if inner.is_empty() {
                        continue;
                    }
                    format!("({inner})")
                }
                Condition::Predicate(predicate) => self.render_predicate(predicate)?,
            };
            if !out.is_empty() {
                out.push(' ');
                out.push_str(condition.boolean().as_str());
                out.push(' ');
            }
            out.push_str(&term);
        }
        Ok(out)
    }

    fn render_predicate(&mut self, predicate: &Predicate) -> Result<String, ExpressionError> {
        let kind = predicate.kind;
        if !self.role.accepts(kind) {
            return Err(ExpressionError::not_key_capable(kind));
        }

        let name = self.state.register_name(&predicate.column);
        trace!(column = %predicate.column, %kind, placeholder = %name, "rendering predicate");

        let term = match kind {
            OperatorKind::Between => {
                let (low, high) = between_bounds(predicate)?;
                let low = self.state.bind_value(low)?;
                let high = self.state.bind_value(high)?;
                format!("({name} BETWEEN {low} AND {high})")
            }
            OperatorKind::In => {
                let items = in_list(predicate)?;
                let placeholders = items
                    .iter()
                    .map(|v| self.state.bind_value(v))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("{name} IN ({})", placeholders.join(", "))
            }
            OperatorKind::Null => format!("attribute_not_exists({name})"),
            OperatorKind::NotNull => format!("attribute_exists({name})"),
            OperatorKind::BeginsWith => {
                let value = self.state.bind_value(&predicate.value)?;
                format!("begins_with({name}, {value})")
            }
            OperatorKind::Contains => {
                let value = self.state.bind_value(&predicate.value)?;
                format!("contains({name}, {value})")
            }
            OperatorKind::NotContains => {
                let value = self.state.bind_value(&predicate.value)?;
                format!("NOT contains({name}, {value})")
            }
            OperatorKind::Eq
            | OperatorKind::Ne
            | OperatorKind::Lt
            | OperatorKind::Le
            | OperatorKind::Gt
            | OperatorKind::Ge => {
                let value = self.state.bind_value(&predicate.value)?;
                format!("{name} {} {value}", comparator(kind))
            }
        };
        Ok(term)
    }
}

fn comparator(kind: OperatorKind) -> &'static str {
    match kind {
        OperatorKind::Ne => "<>",
        OperatorKind::Lt => "<",
        OperatorKind::Le => "<=",
        OperatorKind::Gt => ">",
        OperatorKind::Ge => ">=",
        _ => "=",
    }
}

fn between_bounds(predicate: &Predicate) -> Result<(&Value, &Value), ExpressionError> {
    match predicate.value.as_array().map(Vec::as_slice) {
        Some([low, high]) => Ok((low, high)),
        _ => Err(ExpressionError::malformed(
            &predicate.column,
            predicate.kind,
            "expected a [low, high] pair",
        )),
    }
}

fn in_list(predicate: &Predicate) -> Result<&[Value], ExpressionError> {
    match predicate.value.as_array() {
        Some(items) if !items.is_empty() => Ok(items),
        Some(_) => Err(ExpressionError::malformed(
            &predicate.column,
            predicate.kind,
            "expected at least one value",
        )),
        None => Err(ExpressionError::malformed(
            &predicate.column,
            predicate.kind,
            "expected an array",
        )),
    }
}
