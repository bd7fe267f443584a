//! Update expression compiler.

use std::borrow::Borrow;

use serde_json::Value;
use tracing::debug;

use super::{ExpressionError, ExpressionState};

/// Renders `SET` and `REMOVE` clauses.
#[derive(Debug)]
pub struct UpdateCompiler<'s> {
    state: &'s mut ExpressionState,
}

impl<'s> UpdateCompiler<'s> {
    pub(crate) fn new(state: &'s mut ExpressionState) -> Self {
        Self { state }
    }

    /// `SET #a = :a, #b.#c = :b_c, ...` in iteration order.
    ///
    /// Each value is bound under the attribute name with path separators
    /// flattened to `_`, since value placeholders cannot contain `.` or
    /// brackets. Paths that flatten to an already bound key (`a.b` and
    /// `a_b`) get a numeric suffix. An empty map renders to an empty string.
    pub fn set<I, K, V>(&mut self, attributes: I) -> Result<String, ExpressionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<Value>,
    {
        let mut terms = Vec::new();
        for (name, value) in attributes {
            let name = name.as_ref();
            let name_ph = self.state.register_name(name);
            let value_ph = self
                .state
                .bind_value_as(&flatten_path(name), value.borrow())?;
            terms.push(format!("{name_ph} = {value_ph}"));
        }
        if terms.is_empty() {
            return Ok(String::new());
        }
        let expression = format!("SET {}", terms.join(", "));
        debug!(%expression, "compiled update expression");
        Ok(expression)
    }

    /// `REMOVE #a, #b.#c, ...`.
    ///
    /// Lists every name registered in the state so far, not only `names`;
    /// compile it before anything else registers names.
    pub fn remove<I, K>(&mut self, names: I) -> String
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut any = false;
        for name in names {
            self.state.register_name(name.as_ref());
            any = true;
        }
        if !any {
            return String::new();
        }
        let expression = format!("REMOVE {}", self.state.names().placeholders().join(", "));
        debug!(%expression, "compiled update expression");
        expression
    }
}

/// `a.b[0]` -> `a_b_0`
fn flatten_path(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ']')
        .map(|c| if c == '.' || c == '[' { '_' } else { c })
        .collect()
}
