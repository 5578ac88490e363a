//! Node variants and borrowed views into a [`Benchmark`] tree.

use std::fmt;

use serde::Serialize;

use crate::domain::{Benchmark, Control, NodeId, Section};

/// Metadata carried by the benchmark root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Display name, also used as the root's identifier.
    pub name: NodeId,
    /// Free-form version tag. Empty when unset.
    pub version: String,
}

/// One node of a benchmark tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// The root of the tree.
    Benchmark(Header),
    /// An interior grouping node.
    Section(Section),
    /// A checkable requirement.
    Control(Control),
}

impl Node {
    /// The node's identifier. For the root this is the benchmark name.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        match self {
            Self::Benchmark(header) => &header.name,
            Self::Section(section) => section.id(),
            Self::Control(control) => control.id(),
        }
    }

    /// The node's variant.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Benchmark(_) => NodeKind::Benchmark,
            Self::Section(_) => NodeKind::Section,
            Self::Control(_) => NodeKind::Control,
        }
    }

    /// The node's title, if it has one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Benchmark(_) => None,
            Self::Section(section) => section.title.as_deref(),
            Self::Control(control) => control.title.as_deref(),
        }
    }

    /// Returns the section payload, if this is a section.
    #[must_use]
    pub const fn as_section(&self) -> Option<&Section> {
        match self {
            Self::Section(section) => Some(section),
            _ => None,
        }
    }

    /// Returns the control payload, if this is a control.
    #[must_use]
    pub const fn as_control(&self) -> Option<&Control> {
        match self {
            Self::Control(control) => Some(control),
            _ => None,
        }
    }
}

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The root of the tree.
    Benchmark,
    /// An interior grouping node.
    Section,
    /// A checkable requirement.
    Control,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Benchmark => f.write_str("benchmark"),
            Self::Section => f.write_str("section"),
            Self::Control => f.write_str("control"),
        }
    }
}

/// Opaque handle to a node stored in a [`Benchmark`].
///
/// Handles are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// The benchmark root always occupies the first slot.
    pub(crate) const ROOT: Self = Self(0);
}

/// Arena storage for one node: the payload and its ordered children.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) node: Node,
    pub(crate) children: Vec<NodeIndex>,
}

impl Slot {
    pub(crate) const fn new(node: Node) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }
}

/// A borrowed view of a node and its position in the tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Benchmark,
    index: NodeIndex,
    slot: &'a Slot,
}

impl<'a> NodeRef<'a> {
    pub(crate) const fn new(tree: &'a Benchmark, index: NodeIndex, slot: &'a Slot) -> Self {
        Self { tree, index, slot }
    }

    /// The node's identifier.
    #[must_use]
    pub const fn id(&self) -> &'a NodeId {
        self.slot.node.id()
    }

    /// The node payload.
    #[must_use]
    pub const fn node(&self) -> &'a Node {
        &self.slot.node
    }

    /// The node's variant.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.slot.node.kind()
    }

    /// The node's arena handle.
    #[must_use]
    pub const fn index(&self) -> NodeIndex {
        self.index
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.slot.children.len()
    }

    /// Direct children, in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        self.slot
            .children
            .iter()
            .filter_map(move |&child| tree.get(child))
    }

    /// Depth-first search of the subtree rooted at this node.
    ///
    /// The node itself is checked first, then its children from left to
    /// right. The first match wins.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<NodeRef<'a>> {
        let mut stack = vec![self.index];
        while let Some(current) = stack.pop() {
            let node = self.tree.get(current)?;
            if node.id() == id {
                return Some(node);
            }
            stack.extend(node.slot.children.iter().rev().copied());
        }
        None
    }

    /// Post-order flattening of the subtree rooted at this node.
    ///
    /// Every descendant appears after all of its own descendants, and this
    /// node is always the last element.
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeRef<'a>> {
        self.post_order().collect()
    }

    /// Lazy form of [`NodeRef::traverse`].
    #[must_use]
    pub fn post_order(&self) -> PostOrder<'a> {
        PostOrder::new(self.tree, self.index)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.index)
            .field("kind", &self.kind())
            .field("id", self.id())
            .finish()
    }
}

/// Post-order iterator over a subtree.
///
/// Uses an explicit stack, so arbitrarily deep trees do not recurse.
pub struct PostOrder<'a> {
    tree: &'a Benchmark,
    stack: Vec<(NodeIndex, bool)>,
}

impl<'a> PostOrder<'a> {
    pub(crate) fn new(tree: &'a Benchmark, start: NodeIndex) -> Self {
        Self {
            tree,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, expanded)) = self.stack.pop() {
            let Some(node) = self.tree.get(current) else {
                continue;
            };
            if expanded {
                return Some(node);
            }
            self.stack.push((current, true));
            // Reversed so the leftmost child is expanded first.
            for &child in node.slot.children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
