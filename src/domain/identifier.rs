use std::{borrow::Borrow, fmt, ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Splits a dotted identifier into its parent prefix and numeric final
/// segment.
static PARENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.(\d+)$").expect("pattern is valid"));

/// A dotted identifier locating a node in a benchmark hierarchy.
///
/// Format: one or more `.`-separated segments, e.g. `2`, `2.4`, `2.4.3`.
/// The identifier minus its final `.<digits>` segment is the identifier of
/// the node's parent.
///
/// Construction performs no validation. Shape problems only surface when the
/// parent is resolved (see [`NodeId::parent`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates an identifier from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier has more than one segment.
    #[must_use]
    pub fn is_dotted(&self) -> bool {
        self.0.contains('.')
    }

    /// Number of `.`-separated segments.
    ///
    /// ```
    /// use compliance::NodeId;
    ///
    /// assert_eq!(NodeId::new("1").depth(), 1);
    /// assert_eq!(NodeId::new("2.4.3").depth(), 3);
    /// ```
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }

    /// Resolves the identifier of this node's parent.
    ///
    /// - `Ok(None)` for single-segment identifiers, which live directly under
    ///   the benchmark root.
    /// - `Ok(Some(prefix))` when the identifier ends in `.<digits>`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::NoNumericSuffix`] for dotted identifiers
    /// whose final segment is not numeric or whose prefix is empty (`1.a`,
    /// `1.`, `.1`).
    pub fn parent(&self) -> Result<Option<&str>, IdentifierError> {
        if !self.is_dotted() {
            return Ok(None);
        }
        self.dotted_parent().map(Some)
    }

    /// Resolves the parent of an identifier that must not be top level.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::NoNumericSuffix`] if the identifier does
    /// not end in `.<digits>`, including single-segment identifiers.
    pub fn dotted_parent(&self) -> Result<&str, IdentifierError> {
        PARENT_PATTERN
            .captures(&self.0)
            .and_then(|captures| captures.get(1))
            .map(|prefix| prefix.as_str())
            .ok_or_else(|| IdentifierError::NoNumericSuffix(self.0.clone()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for NodeId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Errors raised while resolving the parent of a dotted identifier.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// The identifier does not end in a `.<digits>` segment.
    #[error("Invalid identifier '{0}': expected a trailing '.<digits>' segment")]
    NoNumericSuffix(String),
}
