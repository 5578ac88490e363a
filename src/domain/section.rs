use serde::Serialize;

use crate::domain::NodeId;

/// An interior grouping node, e.g. `2.4 Network Parameters`.
///
/// Sections may contain further sections or controls. They are created
/// standalone and only become part of a tree through
/// [`Benchmark::add_section`](crate::Benchmark::add_section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    id: NodeId,
    /// Short human-readable heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Section {
    /// Creates a section with no title or description.
    #[must_use]
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The section's dotted identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }
}
