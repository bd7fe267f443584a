//! Condition analysis and expression compilation for the RustStack ODM.
//!
//! Takes an ordered list of field conditions and produces the native request
//! fragments a DynamoDB-style store expects: a chosen index, a key-condition
//! expression, a filter expression, update and projection expressions, and
//! the attribute name/value maps that go with them.
//!
//! ```
//! use ruststack_odm_core::{Condition, IndexCatalog, ReadOptions, RequestPlanner};
//! use ruststack_odm_model::{IndexDescriptor, StoreOperation};
//!
//! let catalog = IndexCatalog::new(IndexDescriptor::primary("pk", Some("sk")));
//! let planner = RequestPlanner::new("orders", catalog);
//! let plan = planner
//!     .plan_read(
//!         &[Condition::eq("pk", "USER#1"), Condition::begins_with("sk", "ORDER#")],
//!         &ReadOptions::new(),
//!     )
//!     .unwrap();
//! assert_eq!(plan.operation, StoreOperation::Query);
//! ```
#![allow(missing_docs, clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod analyzer;
pub mod client;
pub mod config;
pub mod error;
pub mod expression;
pub mod index;
pub mod planner;
pub mod predicate;
pub mod request;

pub use analyzer::ConditionAnalyzer;
pub use client::{ExecutableRequest, StoreClient};
pub use config::OdmConfig;
pub use error::{OdmError, OdmResult};
pub use expression::{ExpressionError, ExpressionState, OperatorKind};
pub use index::{IndexCatalog, IndexMetadata, SelectedIndex};
pub use planner::{ItemUpdate, ReadOptions, ReadPlan, RequestPlanner};
pub use predicate::{BooleanOperator, Condition, ConditionBuilder, Predicate};
pub use request::{FinalizedRequest, QueryRequest, RequestField};
