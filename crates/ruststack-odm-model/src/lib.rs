//! Store-native data model for the RustStack ODM.
//!
//! This crate holds everything that mirrors the key-value store's own wire
//! vocabulary: the tagged-union `AttributeValue`, the codec that marshals
//! plain JSON values into it, key schema and index descriptors, the typed
//! request inputs and the result/error objects returned by store clients.
//! The expression engine in `ruststack-odm-core` builds on top of these.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod marshal;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::{StoreError, StoreErrorCode};
pub use marshal::{MarshalError, Marshaler, ValueMarshaler};
pub use operations::StoreOperation;
pub use output::StoreResponse;
pub use types::{IndexDescriptor, KeySchemaElement, KeyType, ReturnValue, Select};
