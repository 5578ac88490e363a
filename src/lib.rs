//! Hierarchical compliance benchmarks
//!
//! A benchmark is a tree of sections and controls addressed by dotted
//! identifiers such as `2.4.3`. The identifier of a node's parent is implied
//! by its own, so nodes can be inserted one at a time as long as ancestors
//! arrive before descendants.

pub mod domain;
pub use domain::{
    Benchmark, Config, Control, InsertError, InvalidControl, Node, NodeId, NodeKind, NodeRef,
    Placement, Section,
};

/// Loading benchmark definitions from YAML documents.
pub mod storage;
pub use storage::{Definition, LoadError};
