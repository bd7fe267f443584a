//! Store client seam and executable requests.

use ruststack_odm_model::{StoreError, StoreOperation, StoreResponse};
use tracing::debug;

use crate::error::OdmResult;
use crate::request::FinalizedRequest;

/// Transport that carries finalized requests to the store.
///
/// Implementations own retries, timeouts and signing.
pub trait StoreClient {
    /// Issue `operation` with `request` as its payload.
    fn send(
        &self,
        operation: StoreOperation,
        request: &FinalizedRequest,
    ) -> Result<StoreResponse, StoreError>;
}

impl<C: StoreClient + ?Sized> StoreClient for &C {
    fn send(
        &self,
        operation: StoreOperation,
        request: &FinalizedRequest,
    ) -> Result<StoreResponse, StoreError> {
        (**self).send(operation, request)
    }
}

impl<C: StoreClient + ?Sized> StoreClient for std::sync::Arc<C> {
    fn send(
        &self,
        operation: StoreOperation,
        request: &FinalizedRequest,
    ) -> Result<StoreResponse, StoreError> {
        (**self).send(operation, request)
    }
}

/// A finalized request bound to a client.
#[derive(Debug)]
pub struct ExecutableRequest<'c, C: ?Sized> {
    request: FinalizedRequest,
    client: &'c C,
}

impl<'c, C: StoreClient + ?Sized> ExecutableRequest<'c, C> {
    /// Bind `request` to `client`.
    #[must_use]
    pub fn new(request: FinalizedRequest, client: &'c C) -> Self {
        Self { request, client }
    }

    /// Payload that will be sent.
    #[must_use]
    pub fn request(&self) -> &FinalizedRequest {
        &self.request
    }

    /// Forward the payload under `operation`.
    pub fn execute(&self, operation: StoreOperation) -> OdmResult<StoreResponse> {
        debug!(
            %operation,
            table = self.request.table_name().unwrap_or_default(),
            "executing store request"
        );
        let response = self.client.send(operation, &self.request)?;
        debug!(%operation, status = response.status_code, items = response.items.len(), "store responded");
        Ok(response)
    }

    pub fn query(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::Query)
    }

    pub fn scan(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::Scan)
    }

    pub fn get_item(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::GetItem)
    }

    pub fn put_item(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::PutItem)
    }

    pub fn update_item(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::UpdateItem)
    }

    pub fn delete_item(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::DeleteItem)
    }

    pub fn batch_get_item(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::BatchGetItem)
    }

    pub fn batch_write_item(&self) -> OdmResult<StoreResponse> {
        self.execute(StoreOperation::BatchWriteItem)
    }
}
