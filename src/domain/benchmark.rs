//! The benchmark root and its insertion rules.
//!
//! The [`Benchmark`] owns every node in an arena. Each slot stores the node
//! payload and the ordered handles of its children; a separate index maps
//! identifiers to handles so lookups do not walk the tree. Nodes carry no
//! reference to their parent: the parent is implied by the dotted identifier.

use std::collections::HashMap;

use tracing::instrument;

use crate::domain::{
    Config, Control, IdentifierError, NodeId, Section,
    node::{Header, Node, NodeIndex, NodeKind, NodeRef, PostOrder, Slot},
};

/// Errors raised when attaching a node to a benchmark.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InsertError {
    /// The node's parent has not been inserted yet.
    #[error("Failed to find section {parent}")]
    ParentNotFound {
        /// Identifier of the missing parent.
        parent: String,
    },

    /// The node's identifier has no resolvable parent.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    /// A control's identifier is already in use and duplicates are rejected.
    #[error("Identifier {id} is already used by a {existing}")]
    DuplicateId {
        /// The repeated identifier.
        id: String,
        /// Kind of the node already holding the identifier.
        existing: NodeKind,
    },

    /// A section's identifier is held by a node of another kind.
    #[error("Cannot add section {id}: identifier is already used by a {existing}")]
    KindConflict {
        /// The contested identifier.
        id: String,
        /// Kind of the node already holding the identifier.
        existing: NodeKind,
    },
}

/// Where [`Benchmark::add_section`] left a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The section was attached as a new node.
    Inserted(NodeIndex),
    /// A node with the same identifier already existed; the tree is unchanged.
    Existing(NodeIndex),
}

impl Placement {
    /// Handle of the node now holding the identifier.
    #[must_use]
    pub const fn index(self) -> NodeIndex {
        match self {
            Self::Inserted(index) | Self::Existing(index) => index,
        }
    }

    /// Returns `true` if the tree was modified.
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// A compliance benchmark: the root of a tree of sections and controls.
///
/// ```
/// use compliance::{Benchmark, Control, Section};
///
/// let mut benchmark = Benchmark::new("foo");
/// benchmark.add_section(Section::new("1")).unwrap();
/// benchmark.add_section(Section::new("1.1")).unwrap();
/// benchmark.add_control(Control::new("1.1.1")).unwrap();
///
/// let order: Vec<_> = benchmark
///     .traverse(benchmark.root().index())
///     .iter()
///     .map(|node| node.id().to_string())
///     .collect();
/// assert_eq!(order, ["1.1.1", "1.1", "1", "foo"]);
/// ```
#[derive(Debug, Clone)]
pub struct Benchmark {
    /// Arena of nodes. The root is always at index 0.
    slots: Vec<Slot>,

    /// First node inserted for each identifier.
    ///
    /// Nodes sharing an identifier always share a parent, so the first
    /// inserted is also the first reached by a pre-order search.
    index: HashMap<NodeId, NodeIndex>,

    config: Config,
}

impl Benchmark {
    /// Creates an empty benchmark with the default configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, Config::default())
    }

    /// Creates an empty benchmark with the given configuration.
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: Config) -> Self {
        let name = NodeId::new(name);
        let root = Slot::new(Node::Benchmark(Header {
            name: name.clone(),
            version: String::new(),
        }));
        Self {
            slots: vec![root],
            index: HashMap::from([(name, NodeIndex::ROOT)]),
            config,
        }
    }

    /// The benchmark's display name, which is also the root identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        self.header().name.as_str()
    }

    /// The benchmark's version tag. Empty when unset.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.header().version
    }

    /// Sets the version tag.
    pub fn set_version(&mut self, version: impl Into<String>) {
        if let Node::Benchmark(header) = &mut self.slots[NodeIndex::ROOT.0].node {
            header.version = version.into();
        }
    }

    /// The configuration the tree was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Number of sections and controls in the tree, excluding the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    /// Returns `true` if nothing has been attached to the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A view of the root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(self, NodeIndex::ROOT, &self.slots[NodeIndex::ROOT.0])
    }

    /// Looks up a node by handle.
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<NodeRef<'_>> {
        self.slots
            .get(index.0)
            .map(|slot| NodeRef::new(self, index, slot))
    }

    /// Looks up a node by identifier anywhere in the tree.
    ///
    /// If several nodes share the identifier, the one a pre-order search from
    /// the root would reach first is returned.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<NodeRef<'_>> {
        self.index.get(id).and_then(|&index| self.get(index))
    }

    /// Post-order flattening of the subtree rooted at `start`.
    ///
    /// Returns an empty list if `start` does not belong to this tree.
    #[must_use]
    pub fn traverse(&self, start: NodeIndex) -> Vec<NodeRef<'_>> {
        self.get(start)
            .map(|node| node.traverse())
            .unwrap_or_default()
    }

    /// Post-order iterator over the whole tree, ending with the root.
    #[must_use]
    pub fn iter_postorder(&self) -> PostOrder<'_> {
        PostOrder::new(self, NodeIndex::ROOT)
    }

    /// Attaches a section beneath the node named by its dotted identifier.
    ///
    /// Insertion is idempotent by identifier: if any node with the same
    /// identifier already exists, the tree is left untouched and
    /// [`Placement::Existing`] is returned. Single-segment identifiers attach
    /// directly to the root.
    ///
    /// # Errors
    ///
    /// - [`InsertError::ParentNotFound`] if the parent has not been inserted.
    /// - [`InsertError::InvalidIdentifier`] if a dotted identifier does not end
    ///   in a numeric segment.
    /// - [`InsertError::KindConflict`] if the identifier belongs to a
    ///   non-section node and the configuration requires same-kind collisions.
    #[instrument(level = "debug", skip(self, section), fields(id = %section.id()))]
    pub fn add_section(&mut self, section: Section) -> Result<Placement, InsertError> {
        if let Some(existing) = self.find(section.id()) {
            let kind = existing.kind();
            if kind != NodeKind::Section && self.config.requires_same_kind_sections() {
                return Err(InsertError::KindConflict {
                    id: section.id().to_string(),
                    existing: kind,
                });
            }
            tracing::debug!("section already present as a {kind}");
            return Ok(Placement::Existing(existing.index()));
        }

        let parent = match section.id().parent()? {
            Some(parent_id) => self.resolve(parent_id)?,
            None => NodeIndex::ROOT,
        };

        Ok(Placement::Inserted(
            self.attach(parent, Node::Section(section)),
        ))
    }

    /// Attaches a control beneath the node named by its dotted identifier.
    ///
    /// Controls are never top level, and they are not deduplicated: a second
    /// control with an identifier already in the tree is attached next to the
    /// first unless the configuration rejects duplicates.
    ///
    /// # Errors
    ///
    /// - [`InsertError::InvalidIdentifier`] if the identifier does not end in a
    ///   `.<digits>` segment (this includes single-segment identifiers).
    /// - [`InsertError::ParentNotFound`] if the parent has not been inserted.
    /// - [`InsertError::DuplicateId`] if the identifier is taken and the
    ///   configuration rejects duplicates.
    #[instrument(level = "debug", skip(self, control), fields(id = %control.id()))]
    pub fn add_control(&mut self, control: Control) -> Result<NodeIndex, InsertError> {
        let parent = self.resolve(control.id().dotted_parent()?)?;

        if self.config.rejects_duplicate_controls() {
            if let Some(existing) = self.find(control.id()) {
                return Err(InsertError::DuplicateId {
                    id: control.id().to_string(),
                    existing: existing.kind(),
                });
            }
        }

        Ok(self.attach(parent, Node::Control(control)))
    }

    fn header(&self) -> &Header {
        match &self.slots[NodeIndex::ROOT.0].node {
            Node::Benchmark(header) => header,
            _ => unreachable!("the root slot always holds the benchmark header"),
        }
    }

    fn resolve(&self, parent_id: &str) -> Result<NodeIndex, InsertError> {
        self.index
            .get(parent_id)
            .copied()
            .ok_or_else(|| InsertError::ParentNotFound {
                parent: parent_id.to_string(),
            })
    }

    #[instrument(level = "trace", skip(self, node))]
    fn attach(&mut self, parent: NodeIndex, node: Node) -> NodeIndex {
        let index = NodeIndex(self.slots.len());
        self.index.entry(node.id().clone()).or_insert(index);
        tracing::debug!(
            "attached {} {} under {}",
            node.kind(),
            node.id(),
            self.slots[parent.0].node.id()
        );
        self.slots.push(Slot::new(node));
        self.slots[parent.0].children.push(index);
        index
    }
}
