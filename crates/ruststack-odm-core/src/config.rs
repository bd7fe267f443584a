//! ODM configuration.

use std::env;

use crate::expression::names::DEFAULT_NAME_PREFIX;
use crate::expression::placeholder::DEFAULT_PLACEHOLDER_PREFIX;
use crate::expression::values::DEFAULT_VALUE_PREFIX;

/// Request planning configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdmConfig {
    /// Prefix prepended to every table name.
    pub table_prefix: String,
    /// Strongly consistent reads by default.
    pub consistent_read: bool,
    /// Attribute name placeholder prefix.
    pub name_prefix: String,
    /// Attribute value placeholder prefix.
    pub value_prefix: String,
    /// Value placeholder token prefix.
    pub placeholder_prefix: String,
}

impl OdmConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            table_prefix: env::var("ODM_TABLE_PREFIX").unwrap_or(defaults.table_prefix),
            consistent_read: env_bool("ODM_CONSISTENT_READ", defaults.consistent_read),
            name_prefix: env_non_empty("ODM_NAME_PREFIX").unwrap_or(defaults.name_prefix),
            value_prefix: env_non_empty("ODM_VALUE_PREFIX").unwrap_or(defaults.value_prefix),
            placeholder_prefix: env_non_empty("ODM_PLACEHOLDER_PREFIX")
                .unwrap_or(defaults.placeholder_prefix),
        }
    }

    /// Physical table name for a logical one.
    #[must_use]
    pub fn table_name(&self, table: &str) -> String {
        format!("{}{table}", self.table_prefix)
    }
}

impl Default for OdmConfig {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            consistent_read: false,
            name_prefix: DEFAULT_NAME_PREFIX.to_owned(),
            value_prefix: DEFAULT_VALUE_PREFIX.to_owned(),
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_owned(),
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}

/// Placeholder prefixes must not be empty, or names and values would render
/// as bare identifiers.
fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
