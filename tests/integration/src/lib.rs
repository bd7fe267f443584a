//! Integration tests for the RustStack ODM.
//!
//! Requests are planned with [`RequestPlanner`], finalized and executed
//! against [`MemoryStore`], an in-process store client that records every
//! call. Item operations are applied to an in-memory table keyed by the
//! primary index; `Query` and `Scan` return every stored item, since
//! expressions are only inspected, not evaluated.

use std::collections::HashMap;
use std::sync::Once;

use parking_lot::Mutex;
use ruststack_odm_core::{FinalizedRequest, IndexCatalog, RequestPlanner, StoreClient};
use ruststack_odm_model::input::{DeleteItemInput, GetItemInput, PutItemInput};
use ruststack_odm_model::{
    AttributeValue, IndexDescriptor, ReturnValue, StoreError, StoreOperation, StoreResponse,
    store_error,
};

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

type Item = HashMap<String, AttributeValue>;

/// In-memory store client.
#[derive(Debug)]
pub struct MemoryStore {
    primary: IndexDescriptor,
    items: Mutex<Vec<Item>>,
    calls: Mutex<Vec<(StoreOperation, FinalizedRequest)>>,
}

impl MemoryStore {
    /// Empty store whose items are keyed by `primary`.
    #[must_use]
    pub fn new(primary: IndexDescriptor) -> Self {
        Self {
            primary,
            items: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Operations issued so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.calls.lock().iter().map(|(op, _)| *op).collect()
    }

    /// Payload of the most recent call.
    #[must_use]
    pub fn last_request(&self) -> Option<FinalizedRequest> {
        self.calls.lock().last().map(|(_, req)| req.clone())
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    fn key_of(&self, item: &Item) -> Vec<Option<AttributeValue>> {
        self.primary
            .key_attributes()
            .map(|attr| item.get(attr).cloned())
            .collect()
    }

    fn position(&self, items: &[Item], key: &Item) -> Option<usize> {
        let wanted = self.key_of(key);
        items.iter().position(|item| self.key_of(item) == wanted)
    }

    fn put(&self, input: PutItemInput) -> Result<StoreResponse, StoreError> {
        let mut items = self.items.lock();
        let existing = self.position(&items, &input.item);
        check_condition(
            input.condition_expression.as_deref(),
            &input.expression_attribute_names,
            existing.map(|i| &items[i]),
        )?;
        match existing {
            Some(i) => items[i] = input.item,
            None => items.push(input.item),
        }
        Ok(StoreResponse::default())
    }

    fn get(&self, input: &GetItemInput) -> StoreResponse {
        let items = self.items.lock();
        let found = self
            .position(&items, &input.key)
            .map(|i| items[i].clone())
            .into_iter()
            .collect();
        StoreResponse::with_items(found)
    }

    fn delete(&self, input: DeleteItemInput) -> Result<StoreResponse, StoreError> {
        let mut items = self.items.lock();
        let existing = self.position(&items, &input.key);
        check_condition(
            input.condition_expression.as_deref(),
            &input.expression_attribute_names,
            existing.map(|i| &items[i]),
        )?;
        let removed = existing.map(|i| items.remove(i));
        let mut response = StoreResponse::default();
        if input.return_values == Some(ReturnValue::AllOld) {
            response.attributes = removed.unwrap_or_default();
        }
        Ok(response)
    }
}

/// Evaluates the two existence checks the tests use as write guards.
fn check_condition(
    expression: Option<&str>,
    names: &HashMap<String, String>,
    existing: Option<&Item>,
) -> Result<(), StoreError> {
    let Some(expression) = expression else {
        return Ok(());
    };
    let (must_exist, placeholder) =
        if let Some(rest) = expression.strip_prefix("attribute_exists(") {
            (true, rest.trim_end_matches(')'))
        } else if let Some(rest) = expression.strip_prefix("attribute_not_exists(") {
            (false, rest.trim_end_matches(')'))
        } else {
            return Err(store_error!(
                ValidationException,
                format!("unsupported condition: {expression}")
            ));
        };
    let attribute = names.get(placeholder).map_or(placeholder, String::as_str);
    let exists = existing.is_some_and(|item| item.contains_key(attribute));
    if exists == must_exist {
        Ok(())
    } else {
        Err(store_error!(
            ConditionalCheckFailedException,
            "The conditional request failed"
        ))
    }
}

fn invalid(err: &ruststack_odm_core::OdmError) -> StoreError {
    store_error!(SerializationException, err.to_string())
}

impl StoreClient for MemoryStore {
    fn send(
        &self,
        operation: StoreOperation,
        request: &FinalizedRequest,
    ) -> Result<StoreResponse, StoreError> {
        self.calls.lock().push((operation, request.clone()));
        match operation {
            StoreOperation::PutItem => self.put(request.into_input().map_err(|e| invalid(&e))?),
            StoreOperation::GetItem => {
                Ok(self.get(&request.into_input().map_err(|e| invalid(&e))?))
            }
            StoreOperation::DeleteItem => {
                self.delete(request.into_input().map_err(|e| invalid(&e))?)
            }
            StoreOperation::Query | StoreOperation::Scan => {
                Ok(StoreResponse::with_items(self.items.lock().clone()))
            }
            other => Err(store_error!(
                ValidationException,
                format!("{other} is not supported by the in-memory store")
            )),
        }
    }
}

/// Planner and store for an `orders` table keyed by `pk`/`sk` with one
/// global index on `gsi_pk`/`gsi_sk`.
#[must_use]
pub fn orders_fixture() -> (RequestPlanner, MemoryStore) {
    init_tracing();
    let primary = IndexDescriptor::primary("pk", Some("sk"));
    let catalog = IndexCatalog::new(primary.clone())
        .with_secondary(IndexDescriptor::secondary("GSI1", "gsi_pk", Some("gsi_sk")));
    (RequestPlanner::new("orders", catalog), MemoryStore::new(primary))
}

mod test_analyzer;
mod test_planner;
