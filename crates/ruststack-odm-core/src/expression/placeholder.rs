//! Value placeholder allocation.

/// Default token prefix.
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "a";

/// Hands out `a1`, `a2`, ... within one compilation pass.
///
/// Never share an allocator between independent requests: a counter carried
/// over from another request produces placeholders that collide with, or skip
/// past, the values that request actually bound.
#[derive(Debug, Clone)]
pub struct PlaceholderAllocator {
    prefix: String,
    counter: usize,
}

impl Default for PlaceholderAllocator {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PLACEHOLDER_PREFIX)
    }
}

impl PlaceholderAllocator {
    /// Allocator with the default `a` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator with a custom token prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Next token. The first call returns `a1`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> String {
        self.counter += 1;
        format!("{}{}", self.prefix, self.counter)
    }

    /// Number of tokens handed out since the last reset.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.counter
    }

    /// Restart numbering at `a1`.
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
