//! Expression attribute name table.
//!
//! Attribute names are never written into expression strings directly;
//! each one is replaced by a `#name` placeholder so reserved words and
//! special characters cannot break the expression. Document paths such as
//! `address.lines[0].street` get one placeholder per named segment while
//! list indices stay positional: `#address.#lines[0].#street`.

use std::collections::{HashMap, HashSet};

/// Default name placeholder prefix.
pub const DEFAULT_NAME_PREFIX: &str = "#";

/// A single element of a document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// A named attribute.
    Attribute(String),
    /// A list index dereference (`[0]`).
    Index(usize),
}

/// Whether `name` addresses a nested document path rather than a top-level
/// attribute.
#[must_use]
pub fn is_nested_path(name: &str) -> bool {
    name.contains('.') || (name.contains('[') && name.ends_with(']'))
}

/// Split a document path into its elements.
///
/// Segments are separated by `.`; a segment made only of digits, and every
/// trailing `[n]` suffix, becomes an [`PathElement::Index`]. A segment whose
/// brackets do not hold a number is kept as a literal attribute name.
#[must_use]
pub fn split_path(name: &str) -> Vec<PathElement> {
    let mut elements = Vec::new();
    for segment in name.split('.') {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(idx) = segment.parse() {
                elements.push(PathElement::Index(idx));
                continue;
            }
        }
        match split_indices(segment) {
            Some((head, indices)) => {
                if !head.is_empty() {
                    elements.push(PathElement::Attribute(head.to_owned()));
                }
                elements.extend(indices.into_iter().map(PathElement::Index));
            }
            None => elements.push(PathElement::Attribute(segment.to_owned())),
        }
    }
    elements
}

/// `lines[0][2]` -> `("lines", [0, 2])`; `None` when the brackets are not
/// all numeric indices.
fn split_indices(segment: &str) -> Option<(&str, Vec<usize>)> {
    let Some(open) = segment.find('[') else {
        return Some((segment, Vec::new()));
    };
    let (head, mut rest) = segment.split_at(open);
    let mut indices = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indices.push(inner[..close].parse().ok()?);
        rest = &inner[close + 1..];
    }
    Some((head, indices))
}

/// Name placeholder table for one compilation pass.
#[derive(Debug, Clone)]
pub struct AttributeNames {
    prefix: String,
    /// Placeholder -> attribute name (path segments for nested names).
    names: HashMap<String, String>,
    /// Names passed to [`AttributeNames::set`], in first-registration order.
    registered: Vec<String>,
    /// Full dotted names registered as paths.
    nested: HashSet<String>,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_NAME_PREFIX)
    }
}

impl AttributeNames {
    /// Empty table using the `#` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table using a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            names: HashMap::new(),
            registered: Vec::new(),
            nested: HashSet::new(),
        }
    }

    /// Register an attribute name or document path. Idempotent.
    pub fn set(&mut self, name: &str) {
        if !self.registered.iter().any(|n| n == name) {
            self.registered.push(name.to_owned());
        }

        if is_nested_path(name) {
            for element in split_path(name) {
                if let PathElement::Attribute(segment) = element {
                    self.names
                        .insert(format!("{}{segment}", self.prefix), segment);
                }
            }
            self.nested.insert(name.to_owned());
        } else {
            self.names
                .insert(format!("{}{name}", self.prefix), name.to_owned());
        }
    }

    /// Placeholder form of `name`.
    ///
    /// Unregistered simple names come back verbatim, which lets callers pass
    /// through names that already are placeholders.
    #[must_use]
    pub fn placeholder(&self, name: &str) -> String {
        if is_nested_path(name) {
            return self.path_placeholder(name);
        }
        self.segment_placeholder(name)
    }

    fn segment_placeholder(&self, segment: &str) -> String {
        let candidate = format!("{}{segment}", self.prefix);
        if self.names.contains_key(&candidate) {
            candidate
        } else {
            segment.to_owned()
        }
    }

    fn path_placeholder(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() * 2);
        for element in split_path(name) {
            match element {
                PathElement::Attribute(segment) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&self.segment_placeholder(&segment));
                }
                PathElement::Index(idx) => {
                    out.push('[');
                    out.push_str(&idx.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    /// Placeholder -> name map, ready for `ExpressionAttributeNames`.
    #[must_use]
    pub fn all(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// Attribute name behind a placeholder.
    #[must_use]
    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.names.get(placeholder).map(String::as_str)
    }

    /// Placeholders for every registered name, in registration order.
    ///
    /// Nested names appear in their full path form (`#a.#b[0]`), not as their
    /// individual segments. This is cumulative over the table's lifetime.
    #[must_use]
    pub fn placeholders(&self) -> Vec<String> {
        self.registered
            .iter()
            .map(|name| self.placeholder(name))
            .collect()
    }

    /// Whether `name` was registered as a document path.
    #[must_use]
    pub fn is_nested(&self, name: &str) -> bool {
        self.nested.contains(name)
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Forget every registered name.
    pub fn reset(&mut self) {
        self.names.clear();
        self.registered.clear();
        self.nested.clear();
    }

    /// Take the placeholder map, leaving the table empty.
    pub(crate) fn take(&mut self) -> HashMap<String, String> {
        let names = std::mem::take(&mut self.names);
        self.reset();
        names
    }
}
