/// YAML benchmark definitions.
pub mod definition;

pub use definition::{Definition, LoadError, SectionEntry, load};
