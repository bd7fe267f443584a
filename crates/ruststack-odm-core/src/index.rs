//! Index catalog of a document type.

use ruststack_odm_model::{IndexDescriptor, KeySchemaElement};
use serde::{Deserialize, Serialize};

/// Supplies the key layout of a document type.
///
/// Implemented by whatever layer owns document metadata.
pub trait IndexMetadata {
    /// Primary index (empty name).
    fn primary_index(&self) -> IndexDescriptor;

    /// Global secondary indexes, in declaration order.
    fn global_indexes(&self) -> Vec<IndexDescriptor> {
        Vec::new()
    }

    /// Local secondary indexes, in declaration order.
    fn local_indexes(&self) -> Vec<IndexDescriptor> {
        Vec::new()
    }
}

/// Primary index plus secondary indexes, in the order index selection
/// visits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCatalog {
    primary: IndexDescriptor,
    #[serde(default)]
    secondary: Vec<IndexDescriptor>,
}

impl IndexCatalog {
    /// Catalog with only a primary index.
    #[must_use]
    pub fn new(primary: IndexDescriptor) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
        }
    }

    /// Primary index built from a native key schema.
    #[must_use]
    pub fn from_key_schema(key_schema: &[KeySchemaElement]) -> Option<Self> {
        IndexDescriptor::from_key_schema("", key_schema).map(Self::new)
    }

    /// Catalog from a metadata provider: global indexes first, then local.
    #[must_use]
    pub fn from_metadata(metadata: &impl IndexMetadata) -> Self {
        let mut catalog = Self::new(metadata.primary_index());
        catalog.secondary.extend(metadata.global_indexes());
        catalog.secondary.extend(metadata.local_indexes());
        catalog
    }

    /// Append a secondary index.
    #[must_use]
    pub fn with_secondary(mut self, index: IndexDescriptor) -> Self {
        self.secondary.push(index);
        self
    }

    /// Primary index.
    #[must_use]
    pub fn primary(&self) -> &IndexDescriptor {
        &self.primary
    }

    /// Secondary indexes in declaration order.
    #[must_use]
    pub fn secondary(&self) -> &[IndexDescriptor] {
        &self.secondary
    }

    /// Primary first, then secondaries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexDescriptor> {
        std::iter::once(&self.primary).chain(&self.secondary)
    }

    /// Index by name; `""` is the primary index.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&IndexDescriptor> {
        self.iter().find(|index| index.name == name)
    }
}

/// Index chosen by the analyzer.
///
/// `range_attribute` is `None` when only the partition key is used, either
/// because the index has no sort key or because the sort key predicate
/// cannot go into a key condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedIndex {
    /// Index name, empty for the primary index.
    pub name: String,
    /// Partition key attribute.
    pub hash_attribute: String,
    /// Sort key attribute, when it takes part in the key condition.
    pub range_attribute: Option<String>,
}

impl SelectedIndex {
    /// Whether this is the table's primary index.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.name.is_empty()
    }

    /// Whether `column` is one of the key attributes in use.
    #[must_use]
    pub fn is_key_column(&self, column: &str) -> bool {
        self.hash_attribute == column || self.range_attribute.as_deref() == Some(column)
    }
}
