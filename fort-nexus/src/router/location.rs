//! Normalized navigation locations.

use std::fmt;

/// A normalized path such as `/` or `/forts`.
///
/// Always starts with `/`. Built from hash fragments (`#/forts`), bare paths
/// (`forts`) or nothing at all (`""` is the root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(String);

impl Location {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Normalize raw input into a location.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let path = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if path.is_empty() {
            Self::root()
        } else if path.starts_with('/') {
            Self(path.to_string())
        } else {
            Self(format!("/{path}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The fragment form, e.g. `#/forts`.
    pub fn as_hash(&self) -> String {
        format!("#{}", self.0)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Location {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl PartialEq<str> for Location {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Location {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
