//! Domain models for compliance benchmarks.
//!
//! This module contains the benchmark tree, its node variants, dotted
//! identifiers, and configuration.

/// The benchmark root and its insertion rules.
pub mod benchmark;
pub use benchmark::{Benchmark, InsertError, Placement};

mod config;
pub use config::{Config, DuplicateControls, SectionCollisions};

/// Controls and their construction from untyped mappings.
pub mod control;
pub use control::{Control, InvalidControl};

/// Dotted identifiers and parent resolution.
pub mod identifier;
pub use identifier::{IdentifierError, NodeId};

pub mod node;
pub use node::{Header, Node, NodeIndex, NodeKind, NodeRef, PostOrder};

mod section;
pub use section::Section;
