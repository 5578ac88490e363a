use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use serde::Deserialize;
use serde_yaml::Mapping;
use tracing::instrument;

use crate::domain::{Benchmark, Config, Control, InsertError, InvalidControl, Section};

/// A benchmark definition as written in a YAML document.
///
/// ```yaml
/// name: Example Benchmark
/// version: 1.0.0
/// sections:
///   - id: "1"
///     title: Initial Setup
/// controls:
///   - id: "1.1"
///     title: Ensure foo
///     level: 1
/// ```
///
/// Controls are kept as untyped mappings and converted with
/// [`Control::from_mapping`], so unknown keys are tolerated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Definition {
    /// Display name of the benchmark.
    pub name: String,

    /// Version tag.
    #[serde(default)]
    pub version: String,

    /// Sections, parents before children.
    #[serde(default)]
    pub sections: Vec<SectionEntry>,

    /// Controls, in the order they should be attached.
    #[serde(default)]
    pub controls: Vec<Mapping>,
}

/// A section as written in a definition document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionEntry {
    /// Dotted identifier.
    pub id: String,
    /// Short human-readable heading.
    #[serde(default)]
    pub title: Option<String>,
    /// Longer free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl From<SectionEntry> for Section {
    fn from(entry: SectionEntry) -> Self {
        let SectionEntry {
            id,
            title,
            description,
        } = entry;
        let mut section = Self::new(id);
        section.title = title;
        section.description = description;
        section
    }
}

impl Definition {
    /// Parses a definition from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid definition.
    pub fn from_yaml(content: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parses a definition from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the document is not a valid
    /// definition.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Reads a definition from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if the file does not exist, or another
    /// variant if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Io(io_error),
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Builds the benchmark tree.
    ///
    /// Sections are inserted in document order, then controls in document
    /// order. Repeated sections are absorbed; nothing is reordered, so every
    /// parent must appear before its children.
    ///
    /// # Errors
    ///
    /// Returns an error if a control has no usable identifier or a node cannot
    /// be attached.
    #[instrument(level = "debug", skip(self, config), fields(name = %self.name))]
    pub fn build(self, config: Config) -> Result<Benchmark, LoadError> {
        let Self {
            name,
            version,
            sections,
            controls,
        } = self;

        let mut benchmark = Benchmark::with_config(name, config);
        benchmark.set_version(version);

        for entry in sections {
            benchmark.add_section(entry.into())?;
        }
        for mapping in &controls {
            benchmark.add_control(Control::from_mapping(mapping)?)?;
        }

        tracing::debug!("built benchmark with {} nodes", benchmark.len());
        Ok(benchmark)
    }
}

/// Reads a definition file and builds its benchmark tree.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the tree cannot be built.
pub fn load(path: &Path, config: Config) -> Result<Benchmark, LoadError> {
    Definition::load(path)?.build(config)
}

/// Errors that can occur when loading a benchmark definition.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The definition file was not found.
    #[error("definition file not found")]
    NotFound,
    /// An I/O error occurred.
    #[error("failed to read definition")]
    Io(#[from] io::Error),
    /// The YAML document could not be parsed.
    #[error("failed to parse definition")]
    Yaml(#[from] serde_yaml::Error),
    /// A control entry could not be converted.
    #[error(transparent)]
    Control(#[from] InvalidControl),
    /// A node could not be attached to the tree.
    #[error(transparent)]
    Insert(#[from] InsertError),
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::{DuplicateControls, NodeKind};

    const EXAMPLE: &str = r#"
name: Example Benchmark
version: 1.0.0
sections:
  - id: "1"
    title: Initial Setup
  - id: "1.1"
    title: Filesystem
    description: Mount options
  - id: "2"
    title: Services
controls:
  - id: "1.1.1"
    title: Ensure /tmp is a separate partition
    level: 1
    assessment: Automated
    references: [CIS]
  - id: "1.1.2"
    title: Ensure nodev is set on /tmp
  - id: "2.1"
    title: Ensure time synchronisation is in use
"#;

    fn ids(benchmark: &Benchmark) -> Vec<String> {
        benchmark
            .iter_postorder()
            .map(|node| node.id().to_string())
            .collect()
    }

    #[test]
    fn builds_tree_from_yaml() {
        let benchmark = Definition::from_yaml(EXAMPLE)
            .unwrap()
            .build(Config::default())
            .unwrap();

        assert_eq!(benchmark.name(), "Example Benchmark");
        assert_eq!(benchmark.version(), "1.0.0");
        assert_eq!(
            ids(&benchmark),
            ["1.1.1", "1.1.2", "1.1", "1", "2.1", "2", "Example Benchmark"]
        );

        let section = benchmark.find("1.1").unwrap();
        assert_eq!(section.kind(), NodeKind::Section);
        let section = section.node().as_section().unwrap();
        assert_eq!(section.title.as_deref(), Some("Filesystem"));
        assert_eq!(section.description.as_deref(), Some("Mount options"));

        let control = benchmark.find("1.1.1").unwrap();
        let control = control.node().as_control().unwrap();
        assert_eq!(control.level.as_deref(), Some("1"));
        assert_eq!(control.assessment.as_deref(), Some("Automated"));
    }

    #[test]
    fn version_defaults_to_empty() {
        let benchmark = Definition::from_yaml("name: bare")
            .unwrap()
            .build(Config::default())
            .unwrap();
        assert_eq!(benchmark.version(), "");
        assert!(benchmark.is_empty());
    }

    #[test]
    fn reads_from_reader() {
        let definition = Definition::from_reader(Cursor::new(EXAMPLE)).unwrap();
        assert_eq!(definition.sections.len(), 3);
        assert_eq!(definition.controls.len(), 3);
    }

    #[test]
    fn control_without_id_fails() {
        let error = Definition::from_yaml("name: x\nsections: [{id: '1'}]\ncontrols: [{title: y}]")
            .unwrap()
            .build(Config::default())
            .unwrap_err();
        assert!(matches!(error, LoadError::Control(InvalidControl::Missing)));
    }

    #[test]
    fn control_with_numeric_id_fails() {
        let error = Definition::from_yaml("name: x\nsections: [{id: '1'}]\ncontrols: [{id: 1.1}]")
            .unwrap()
            .build(Config::default())
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Control(InvalidControl::WrongType { .. })
        ));
    }

    #[test]
    fn out_of_order_sections_fail() {
        let error = Definition::from_yaml("name: x\nsections: [{id: '1.1'}, {id: '1'}]")
            .unwrap()
            .build(Config::default())
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Insert(InsertError::ParentNotFound { parent }) if parent == "1"
        ));
    }

    #[test]
    fn config_is_applied() {
        let config = Config {
            duplicate_controls: DuplicateControls::Reject,
            ..Config::default()
        };
        let error = Definition::from_yaml(
            "name: x\nsections: [{id: '1'}]\ncontrols: [{id: '1.1'}, {id: '1.1'}]",
        )
        .unwrap()
        .build(config)
        .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Insert(InsertError::DuplicateId { .. })
        ));
    }

    #[test]
    fn missing_name_is_a_parse_error() {
        let result = Definition::from_yaml("version: 1.0.0");
        assert!(matches!(result, Err(LoadError::Yaml(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("benchmark.yaml");
        std::fs::write(&path, EXAMPLE).unwrap();

        let benchmark = load(&path, Config::default()).unwrap();
        assert_eq!(benchmark.len(), 6);
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Definition::load(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(LoadError::NotFound)));
    }
}
