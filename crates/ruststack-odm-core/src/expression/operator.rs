//! Comparison operator catalog.
//!
//! Maps the human-facing symbols (`=`, `>=`, `begins_with`, ...) onto
//! canonical operator kinds (`EQ`, `GE`, `BEGINS_WITH`, ...) and records which
//! kinds the store accepts in a key condition for each key role.

use std::fmt;
use std::str::FromStr;

use ruststack_odm_model::KeyType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ExpressionError;

/// Canonical comparison kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `in`
    In,
    /// `!=`
    Ne,
    /// `begins_with`
    BeginsWith,
    /// `between`
    Between,
    /// `not_contains`
    NotContains,
    /// `contains`
    Contains,
    /// `null`, attribute absent.
    Null,
    /// `not_null`, attribute present.
    NotNull,
}

const SUPPORTED_KINDS: [OperatorKind; 13] = [
    OperatorKind::Eq,
    OperatorKind::Gt,
    OperatorKind::Ge,
    OperatorKind::Lt,
    OperatorKind::Le,
    OperatorKind::In,
    OperatorKind::Ne,
    OperatorKind::BeginsWith,
    OperatorKind::Between,
    OperatorKind::NotContains,
    OperatorKind::Contains,
    OperatorKind::Null,
    OperatorKind::NotNull,
];

const HASH_KEY_KINDS: [OperatorKind; 1] = [OperatorKind::Eq];

const RANGE_KEY_KINDS: [OperatorKind; 7] = [
    OperatorKind::Eq,
    OperatorKind::Le,
    OperatorKind::Lt,
    OperatorKind::Ge,
    OperatorKind::Gt,
    OperatorKind::BeginsWith,
    OperatorKind::Between,
];

impl OperatorKind {
    /// Canonical kind name (`"EQ"`, `"BEGINS_WITH"`, ...).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::In => "IN",
            Self::Ne => "NE",
            Self::BeginsWith => "BEGINS_WITH",
            Self::Between => "BETWEEN",
            Self::NotContains => "NOT_CONTAINS",
            Self::Contains => "CONTAINS",
            Self::Null => "NULL",
            Self::NotNull => "NOT_NULL",
        }
    }

    /// Human-facing symbol (`"="`, `"begins_with"`, ...).
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::In => "in",
            Self::Ne => "!=",
            Self::BeginsWith => "begins_with",
            Self::Between => "between",
            Self::NotContains => "not_contains",
            Self::Contains => "contains",
            Self::Null => "null",
            Self::NotNull => "not_null",
        }
    }

    /// Look up the kind for a symbol, case-insensitively.
    pub fn from_symbol(symbol: &str) -> Result<Self, ExpressionError> {
        SUPPORTED_KINDS
            .into_iter()
            .find(|k| k.symbol().eq_ignore_ascii_case(symbol))
            .ok_or_else(|| ExpressionError::unknown_operator(symbol))
    }

    /// Look up a kind by its canonical name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, ExpressionError> {
        SUPPORTED_KINDS
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ExpressionError::unknown_operator(name))
    }

    /// Symbol for a canonical kind name.
    pub fn symbol_for(name: &str) -> Result<&'static str, ExpressionError> {
        Self::from_name(name).map(|k| k.symbol())
    }

    /// Every kind the catalog knows.
    #[must_use]
    pub fn supported_kinds() -> &'static [Self] {
        &SUPPORTED_KINDS
    }

    /// Kinds the store accepts in a key condition for the given key role.
    ///
    /// A partition key only takes equality; a sort key also takes ranges and
    /// prefixes.
    #[must_use]
    pub fn query_capable_kinds(role: KeyType) -> &'static [Self] {
        match role {
            KeyType::Hash => &HASH_KEY_KINDS,
            KeyType::Range => &RANGE_KEY_KINDS,
        }
    }

    /// Whether this kind may appear in a key condition for `role`.
    #[must_use]
    pub fn is_query_capable(&self, role: KeyType) -> bool {
        Self::query_capable_kinds(role).contains(self)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either a symbol or a canonical name.
impl FromStr for OperatorKind {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).or_else(|_| Self::from_name(s))
    }
}

impl Serialize for OperatorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperatorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
