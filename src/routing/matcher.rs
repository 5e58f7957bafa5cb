//! Route matching logic.
//!
//! # Design Decisions
//! - Exact, case-sensitive comparison of the whole path
//! - No wildcards, no prefix semantics, no trailing-slash folding
//! - Query strings and fragments are stripped before comparison

/// Matches one navigation path exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    path: String,
}

impl PathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if `requested` names this path.
    pub fn matches(&self, requested: &str) -> bool {
        strip_suffixes(requested) == self.path
    }
}

/// Drop `?query` and `#fragment` from a navigation target.
pub fn strip_suffixes(requested: &str) -> &str {
    let end = requested.find(|c: char| c == '?' || c == '#').unwrap_or(requested.len());
    &requested[..end]
}
