//! Request planning.
//!
//! Ties the analyzer, the expression compilers and the request builder
//! together: every plan gets its own [`ExpressionState`], compiles the
//! clauses it needs into it and hands the resulting attribute maps over to
//! the request exactly once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ruststack_odm_model::{
    AttributeValue, Marshaler, ReturnValue, StoreOperation, StoreResponse, ValueMarshaler,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::analyzer::ConditionAnalyzer;
use crate::client::StoreClient;
use crate::config::OdmConfig;
use crate::error::OdmResult;
use crate::expression::ExpressionState;
use crate::index::{IndexCatalog, SelectedIndex};
use crate::predicate::Condition;
use crate::request::{FinalizedRequest, QueryRequest, RequestField};

/// Caller options for a read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadOptions {
    /// Index name to restrict selection to; `""` is the primary index.
    pub index: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Consistency flag; the configured default when unset.
    pub consistent_read: Option<bool>,
    /// Cursor from a previous page.
    pub exclusive_start_key: Option<Map<String, Value>>,
    /// Descending sort key order.
    pub descending: bool,
    /// Attributes to return; all when empty.
    pub projection: Vec<String>,
}

impl ReadOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn consistent(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    #[must_use]
    pub fn starting_after(mut self, key: Map<String, Value>) -> Self {
        self.exclusive_start_key = Some(key);
        self
    }

    #[must_use]
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    #[must_use]
    pub fn project<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.extend(columns.into_iter().map(Into::into));
        self
    }
}

/// A planned read: which operation to issue and with what payload.
#[derive(Debug, Clone)]
pub struct ReadPlan {
    /// `GetItem`, `Query` or `Scan`.
    pub operation: StoreOperation,
    /// Index the analyzer chose, if any.
    pub index: Option<SelectedIndex>,
    /// Assembled request.
    pub request: QueryRequest,
}

impl ReadPlan {
    /// Wire-ready payload.
    #[must_use]
    pub fn finalize(&self) -> FinalizedRequest {
        self.request.finalize()
    }

    /// Finalize and send through `client`.
    pub fn execute<C: StoreClient + ?Sized>(&self, client: &C) -> OdmResult<StoreResponse> {
        self.finalize().prepare(client).execute(self.operation)
    }
}

/// Changes to apply to one item.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    /// Attributes (or document paths) to assign.
    pub set: Map<String, Value>,
    /// Attributes (or document paths) to remove.
    pub remove: Vec<String>,
    /// Condition the item must satisfy.
    pub condition: Vec<Condition>,
    /// What the store should return.
    pub return_values: Option<ReturnValue>,
}

impl ItemUpdate {
    /// Empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `name`.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(name.into(), value.into());
        self
    }

    /// Remove `name`.
    #[must_use]
    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.remove.push(name.into());
        self
    }

    /// Only apply when `condition` holds.
    #[must_use]
    pub fn when(mut self, condition: Vec<Condition>) -> Self {
        self.condition = condition;
        self
    }

    /// Request return values.
    #[must_use]
    pub fn returning(mut self, mode: ReturnValue) -> Self {
        self.return_values = Some(mode);
        self
    }
}

/// Plans requests against one table.
pub struct RequestPlanner {
    table: String,
    catalog: IndexCatalog,
    config: OdmConfig,
    marshaler: Arc<dyn ValueMarshaler>,
}

impl fmt::Debug for RequestPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPlanner")
            .field("table", &self.table)
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RequestPlanner {
    /// Planner with default configuration and the JSON marshaler.
    #[must_use]
    pub fn new(table: impl Into<String>, catalog: IndexCatalog) -> Self {
        Self {
            table: table.into(),
            catalog,
            config: OdmConfig::default(),
            marshaler: Arc::new(Marshaler),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: OdmConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the value codec.
    #[must_use]
    pub fn with_marshaler(mut self, marshaler: Arc<dyn ValueMarshaler>) -> Self {
        self.marshaler = marshaler;
        self
    }

    /// Index catalog.
    #[must_use]
    pub fn catalog(&self) -> &IndexCatalog {
        &self.catalog
    }

    /// Physical table name.
    #[must_use]
    pub fn table_name(&self) -> String {
        self.config.table_name(&self.table)
    }

    fn fresh_state(&self) -> ExpressionState {
        ExpressionState::from_config(&self.config).with_marshaler(Arc::clone(&self.marshaler))
    }

    fn marshal_item(&self, item: &Map<String, Value>) -> OdmResult<HashMap<String, AttributeValue>> {
        Ok(self.marshaler.marshal_item(item)?)
    }

    /// Plan a read.
    ///
    /// A request that pins the whole primary key by equality and nothing
    /// else becomes a `GetItem`. Otherwise a selected index makes it a
    /// `Query`, and with no usable index every condition goes into the
    /// filter of a `Scan`.
    pub fn plan_read(&self, conditions: &[Condition], options: &ReadOptions) -> OdmResult<ReadPlan> {
        let hint = options.index.as_deref();
        let analyzer = ConditionAnalyzer::analyze(conditions)
            .on(&self.catalog)
            .with_index(hint);

        let mut state = self.fresh_state();
        let projection = state.projection().parse(&options.projection);

        let mut request = QueryRequest::for_table(&self.table_name());
        request
            .set_projection_expression(&projection)
            .set_consistent_read(options.consistent_read.unwrap_or(self.config.consistent_read));

        if hint.is_none_or(str::is_empty) && self.pins_primary_key(&analyzer) {
            let key = self.key_from_conditions(&analyzer.key_conditions())?;
            request.set_key(&key)?;
            request.set_attribute_maps(state.take_attribute_maps())?;
            debug!(table = %self.table, "planned GetItem");
            return Ok(ReadPlan {
                operation: StoreOperation::GetItem,
                index: analyzer.selected_index(),
                request,
            });
        }

        let index = analyzer.selected_index();
        let operation = match &index {
            Some(selected) => {
                let key_expression = state.key_conditions().compile(&analyzer.key_conditions())?;
                let filter_expression = state.filter().compile(&analyzer.filter_conditions())?;
                request
                    .set_index_name(&selected.name)
                    .set_key_condition_expression(&key_expression)
                    .set_filter_expression(&filter_expression);
                if options.descending {
                    request.set(RequestField::ScanIndexForward, false);
                }
                StoreOperation::Query
            }
            None => {
                let filter_expression = state.filter().compile(conditions)?;
                if let Some(scan_index) = hint.and_then(|name| self.catalog.find(name)) {
                    request.set_index_name(&scan_index.name);
                }
                request.set_filter_expression(&filter_expression);
                StoreOperation::Scan
            }
        };

        if let Some(limit) = options.limit {
            request.set_limit(limit);
        }
        if let Some(start) = &options.exclusive_start_key {
            request.set_exclusive_start_key(&self.marshal_item(start)?)?;
        }
        request.set_attribute_maps(state.take_attribute_maps())?;

        debug!(table = %self.table, %operation, index = ?index.as_ref().map(|i| &i.name), "planned read");
        Ok(ReadPlan {
            operation,
            index,
            request,
        })
    }

    /// Plan an `UpdateItem`.
    pub fn plan_update(&self, key: &Map<String, Value>, update: &ItemUpdate) -> OdmResult<QueryRequest> {
        let mut state = self.fresh_state();
        // REMOVE lists every registered name, so it must run first.
        let remove = state.update().remove(&update.remove);
        let set = state.update().set(&update.set)?;
        let condition = state.filter().compile(&update.condition)?;

        let expression = [set, remove]
            .into_iter()
            .filter(|clause| !clause.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut request = QueryRequest::for_table(&self.table_name());
        request.set_key(&self.marshal_item(key)?)?;
        request
            .set_update_expression(&expression)
            .set_condition_expression(&condition);
        if let Some(mode) = update.return_values {
            request.set_return_values(mode);
        }
        request.set_attribute_maps(state.take_attribute_maps())?;
        debug!(table = %self.table, %expression, "planned UpdateItem");
        Ok(request)
    }

    /// Plan a `PutItem`, optionally guarded by `condition`.
    pub fn plan_put(&self, item: &Map<String, Value>, condition: &[Condition]) -> OdmResult<QueryRequest> {
        let mut state = self.fresh_state();
        let condition = state.filter().compile(condition)?;

        let mut request = QueryRequest::for_table(&self.table_name());
        request.set_item(&self.marshal_item(item)?)?;
        request.set_condition_expression(&condition);
        request.set_attribute_maps(state.take_attribute_maps())?;
        debug!(table = %self.table, "planned PutItem");
        Ok(request)
    }

    /// Plan a `DeleteItem`, optionally guarded by `condition`.
    pub fn plan_delete(&self, key: &Map<String, Value>, condition: &[Condition]) -> OdmResult<QueryRequest> {
        let mut state = self.fresh_state();
        let condition = state.filter().compile(condition)?;

        let mut request = QueryRequest::for_table(&self.table_name());
        request.set_key(&self.marshal_item(key)?)?;
        request.set_condition_expression(&condition);
        request.set_attribute_maps(state.take_attribute_maps())?;
        debug!(table = %self.table, "planned DeleteItem");
        Ok(request)
    }

    /// Exact search whose conditions are exactly one equality per primary
    /// key attribute.
    fn pins_primary_key(&self, analyzer: &ConditionAnalyzer<'_>) -> bool {
        if !analyzer.is_exact_search() {
            return false;
        }
        let primary = self.catalog.primary();
        let conditions = analyzer.conditions();
        conditions.len() == primary.key_attributes().count()
            && primary
                .key_attributes()
                .all(|attr| conditions.iter().any(|c| c.column() == Some(attr)))
    }

    fn key_from_conditions(&self, conditions: &[Condition]) -> OdmResult<HashMap<String, AttributeValue>> {
        conditions
            .iter()
            .filter_map(Condition::as_predicate)
            .map(|p| -> OdmResult<(String, AttributeValue)> {
                Ok((p.column.clone(), self.marshaler.marshal_value(&p.value)?))
            })
            .collect()
    }
}
