//! Shared store types: key schemas, index descriptors and request enums.
//!
//! Enums serialize to the `SCREAMING_SNAKE_CASE` strings the store expects.

use serde::{Deserialize, Serialize};

/// String-valued wire enum with `as_str` and `Display`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// Wire string.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Role of an attribute within a key schema.
    KeyType {
        /// Partition key.
        Hash => "HASH",
        /// Sort key.
        Range => "RANGE",
    }
}

wire_enum! {
    /// What a write operation hands back.
    #[derive(Default)]
    ReturnValue {
        #[default]
        None => "NONE",
        AllOld => "ALL_OLD",
        UpdatedOld => "UPDATED_OLD",
        AllNew => "ALL_NEW",
        UpdatedNew => "UPDATED_NEW",
    }
}

wire_enum! {
    /// Attribute selection of a `Query` or `Scan`.
    Select {
        AllAttributes => "ALL_ATTRIBUTES",
        AllProjectedAttributes => "ALL_PROJECTED_ATTRIBUTES",
        SpecificAttributes => "SPECIFIC_ATTRIBUTES",
        /// Only the number of matching items.
        Count => "COUNT",
    }
}

/// An element of the key schema for a table or index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    /// The name of the key attribute.
    pub attribute_name: String,
    /// The role of the attribute in the key schema.
    pub key_type: KeyType,
}

impl KeySchemaElement {
    /// Partition key element.
    #[must_use]
    pub fn hash(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            key_type: KeyType::Hash,
        }
    }

    /// Sort key element.
    #[must_use]
    pub fn range(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            key_type: KeyType::Range,
        }
    }
}

/// Key layout of one access path of a document type.
///
/// The primary index is identified by an empty `name`; secondary (global or
/// local) indexes carry their index name. Metadata providers hand these out
/// per document type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    /// Index name, empty for the primary index.
    #[serde(default)]
    pub name: String,
    /// Partition key attribute.
    pub hash_attribute: String,
    /// Optional sort key attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_attribute: Option<String>,
}

impl IndexDescriptor {
    /// Primary index descriptor.
    #[must_use]
    pub fn primary(hash_attribute: impl Into<String>, range_attribute: Option<&str>) -> Self {
        Self::secondary("", hash_attribute, range_attribute)
    }

    /// Secondary index descriptor.
    #[must_use]
    pub fn secondary(
        name: impl Into<String>,
        hash_attribute: impl Into<String>,
        range_attribute: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            hash_attribute: hash_attribute.into(),
            range_attribute: range_attribute.map(str::to_owned),
        }
    }

    /// Build a descriptor from a native key schema.
    ///
    /// Returns `None` when the schema has no `HASH` element.
    #[must_use]
    pub fn from_key_schema(name: impl Into<String>, key_schema: &[KeySchemaElement]) -> Option<Self> {
        let hash = key_schema.iter().find(|e| e.key_type == KeyType::Hash)?;
        let range = key_schema.iter().find(|e| e.key_type == KeyType::Range);
        Some(Self {
            name: name.into(),
            hash_attribute: hash.attribute_name.clone(),
            range_attribute: range.map(|e| e.attribute_name.clone()),
        })
    }

    /// Whether this is the table's primary index.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.name.is_empty()
    }

    /// Key attribute names, hash first.
    pub fn key_attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hash_attribute.as_str()).chain(self.range_attribute.as_deref())
    }
}
