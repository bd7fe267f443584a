//! Projection expression compiler.

use tracing::debug;

use super::ExpressionState;

/// Renders `ProjectionExpression` column lists.
#[derive(Debug)]
pub struct ProjectionCompiler<'s> {
    state: &'s mut ExpressionState,
}

impl<'s> ProjectionCompiler<'s> {
    pub(crate) fn new(state: &'s mut ExpressionState) -> Self {
        Self { state }
    }

    /// Register `columns` and return every name placeholder known to the
    /// state, comma-joined.
    ///
    /// The result covers all names registered so far, so parse projections
    /// on a fresh state.
    pub fn parse<I, K>(&mut self, columns: I) -> String
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for column in columns {
            self.state.register_name(column.as_ref());
        }
        let expression = self.state.names().placeholders().join(", ");
        debug!(%expression, "compiled projection expression");
        expression
    }
}
