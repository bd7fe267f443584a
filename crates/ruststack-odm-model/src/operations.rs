//! Store operations a finalized request can be executed as.

use std::fmt;

/// Native store operations reachable from the ODM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    // Reads
    /// Query items by key condition.
    Query,
    /// Scan all items of a table or index.
    Scan,
    /// Get a single item by primary key.
    GetItem,

    // Writes
    /// Put (insert or replace) an item.
    PutItem,
    /// Update an item in place.
    UpdateItem,
    /// Delete an item by primary key.
    DeleteItem,

    // Batch
    /// Batch get items from one or more tables.
    BatchGetItem,
    /// Batch put/delete items in one or more tables.
    BatchWriteItem,
}

impl StoreOperation {
    /// Returns the native operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Scan => "Scan",
            Self::GetItem => "GetItem",
            Self::PutItem => "PutItem",
            Self::UpdateItem => "UpdateItem",
            Self::DeleteItem => "DeleteItem",
            Self::BatchGetItem => "BatchGetItem",
            Self::BatchWriteItem => "BatchWriteItem",
        }
    }

    /// Parse a native operation name. Accepts the lower camel case form
    /// (`getItem`) as well.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "Query" | "query" => Self::Query,
            "Scan" | "scan" => Self::Scan,
            "GetItem" | "getItem" => Self::GetItem,
            "PutItem" | "putItem" => Self::PutItem,
            "UpdateItem" | "updateItem" => Self::UpdateItem,
            "DeleteItem" | "deleteItem" => Self::DeleteItem,
            "BatchGetItem" | "batchGetItem" => Self::BatchGetItem,
            "BatchWriteItem" | "batchWriteItem" => Self::BatchWriteItem,
            _ => return None,
        };
        Some(op)
    }

    /// Whether the operation only reads.
    #[must_use]
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Self::Query | Self::Scan | Self::GetItem | Self::BatchGetItem
        )
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_both_name_forms() {
        assert_eq!(StoreOperation::from_name("GetItem"), Some(StoreOperation::GetItem));
        assert_eq!(StoreOperation::from_name("getItem"), Some(StoreOperation::GetItem));
        assert_eq!(StoreOperation::from_name("CreateTable"), None);
    }

    #[test]
    fn test_should_classify_reads() {
        assert!(StoreOperation::Scan.is_read());
        assert!(!StoreOperation::UpdateItem.is_read());
    }
}
