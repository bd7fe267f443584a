//! Result object returned by store clients.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;

/// Raw store response.
///
/// Reads fill `items` (a single `GetItem` hit is one element); writes that
/// asked for return values put them in `attributes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoreResponse {
    /// HTTP status code of the call.
    #[serde(default = "default_status_code")]
    pub status_code: u16,

    /// Raw items returned by a read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<HashMap<String, AttributeValue>>,

    /// Attributes returned by a write.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, AttributeValue>,

    /// Number of items after filtering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,

    /// Pagination cursor; empty when there are no more pages.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub last_evaluated_key: HashMap<String, AttributeValue>,
}

fn default_status_code() -> u16 {
    200
}

impl StoreResponse {
    /// Successful read response with the given items.
    #[must_use]
    pub fn with_items(items: Vec<HashMap<String, AttributeValue>>) -> Self {
        let count = i32::try_from(items.len()).ok();
        Self {
            status_code: default_status_code(),
            items,
            count,
            ..Default::default()
        }
    }

    /// Whether another page can be requested.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.last_evaluated_key.is_empty()
    }

    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
