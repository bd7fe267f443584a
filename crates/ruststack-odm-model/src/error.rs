//! Store error types.
//!
//! Store clients report failures with a [`StoreError`]. JSON error responses
//! name the failure in a `__type` field (`<namespace>#<Code>`); the code part
//! maps onto [`StoreErrorCode`].

use std::fmt;

use http::StatusCode;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $code:ident => $status:ident),+ $(,)?) => {
        /// Well-known store error codes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum StoreErrorCode {
            $($(#[$doc])* $code,)+
        }

        impl StoreErrorCode {
            /// Code name as it appears on the wire.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$code => stringify!($code),)+
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($code) => Some(Self::$code),)+
                    _ => None,
                }
            }

            /// HTTP status a store answers this code with.
            #[must_use]
            pub fn default_status_code(&self) -> StatusCode {
                match self {
                    $(Self::$code => StatusCode::$status,)+
                }
            }
        }
    };
}

error_codes! {
    /// Table or index not found.
    ResourceNotFoundException => BAD_REQUEST,
    /// Condition expression evaluated to false.
    ConditionalCheckFailedException => BAD_REQUEST,
    /// Provisioned throughput exceeded.
    ProvisionedThroughputExceededException => BAD_REQUEST,
    /// Account-level request limit exceeded.
    RequestLimitExceeded => BAD_REQUEST,
    /// Request failed validation.
    ValidationException => BAD_REQUEST,
    /// Payload could not be decoded.
    SerializationException => BAD_REQUEST,
    /// Credentials or operation not recognized.
    UnrecognizedClientException => BAD_REQUEST,
    /// Store-side failure.
    InternalServerError => INTERNAL_SERVER_ERROR,
}

impl StoreErrorCode {
    /// Parse a `__type` value, qualified (`ns#Code`) or bare.
    #[must_use]
    pub fn from_error_type(error_type: &str) -> Option<Self> {
        Self::from_name(error_type.rsplit_once('#').map_or(error_type, |(_, code)| code))
    }

    /// Whether the store rejected the request for rate reasons.
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        matches!(
            self,
            Self::ProvisionedThroughputExceededException | Self::RequestLimitExceeded
        )
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by a store client.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
    pub status_code: StatusCode,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Error whose message is the code name.
    #[must_use]
    pub fn new(code: StoreErrorCode) -> Self {
        Self::with_message(code, code.as_str())
    }

    #[must_use]
    pub fn with_message(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status_code: code.default_status_code(),
            source: None,
        }
    }

    /// Attach the transport error that caused this one.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        self.code.is_throttling()
    }

    #[must_use]
    pub fn conditional_check_failed(message: impl Into<String>) -> Self {
        Self::with_message(StoreErrorCode::ConditionalCheckFailedException, message)
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(StoreErrorCode::ValidationException, message)
    }
}

/// Build a [`StoreError`] from a code name and an optional message.
///
/// ```
/// use ruststack_odm_model::store_error;
/// use ruststack_odm_model::error::StoreErrorCode;
///
/// let err = store_error!(ValidationException);
/// assert_eq!(err.code, StoreErrorCode::ValidationException);
///
/// let err = store_error!(ResourceNotFoundException, "Table not found");
/// assert_eq!(err.message, "Table not found");
/// ```
#[macro_export]
macro_rules! store_error {
    ($code:ident) => {
        $crate::error::StoreError::new($crate::error::StoreErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::StoreError::with_message($crate::error::StoreErrorCode::$code, $msg)
    };
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_should_parse_qualified_error_type() {
        assert_eq!(
            StoreErrorCode::from_error_type("com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException"),
            Some(StoreErrorCode::ConditionalCheckFailedException)
        );
        assert_eq!(
            StoreErrorCode::from_error_type("ValidationException"),
            Some(StoreErrorCode::ValidationException)
        );
        assert_eq!(StoreErrorCode::from_error_type("Nope"), None);
    }

    #[test]
    fn test_should_flag_throttling_errors() {
        assert!(store_error!(RequestLimitExceeded).is_throttling());
        assert!(!StoreError::validation("bad").is_throttling());
    }

    #[test]
    fn test_should_map_internal_error_to_500() {
        let err = store_error!(InternalServerError, "boom");
        assert_eq!(err.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "InternalServerError: boom");
    }

    #[test]
    fn test_should_expose_source() {
        let io = std::io::Error::other("connection reset");
        let err = StoreError::new(StoreErrorCode::InternalServerError).with_source(io);
        assert_eq!(err.message, "InternalServerError");
        assert_eq!(err.source().unwrap().to_string(), "connection reset");
    }
}
