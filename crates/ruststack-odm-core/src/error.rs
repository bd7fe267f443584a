//! Crate-level error type.

use ruststack_odm_model::{MarshalError, StoreError};

use crate::expression::ExpressionError;

/// Errors surfaced by planning, building and executing requests.
#[derive(Debug, thiserror::Error)]
pub enum OdmError {
    /// Expression compilation failed.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    /// A key, item or value could not be marshaled.
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    /// The store client reported an error.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A request payload could not be converted.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// `set_field` was given a name outside the request field table.
    #[error("Unknown request field: {0}")]
    UnknownRequestField(String),
}

impl OdmError {
    /// Whether the store rejected the request because a condition failed.
    #[must_use]
    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(
            self,
            Self::Store(e) if e.code == ruststack_odm_model::StoreErrorCode::ConditionalCheckFailedException
        )
    }
}

/// Result alias for [`OdmError`].
pub type OdmResult<T> = Result<T, OdmError>;
