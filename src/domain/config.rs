use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for building benchmark trees.
///
/// The defaults reproduce the permissive insertion rules: repeated sections
/// are idempotent no matter what kind of node already holds the identifier,
/// and repeated controls are appended side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// What to do when a control's identifier is already in the tree.
    pub duplicate_controls: DuplicateControls,

    /// Which existing nodes make a section insertion a no-op.
    pub section_collisions: SectionCollisions,
}

impl Config {
    /// Reads insertion policies from a versioned TOML file.
    ///
    /// Keys left out of the file keep their permissive defaults, but the
    /// `_version` tag is mandatory.
    ///
    /// # Errors
    ///
    /// Returns a message naming the path if the file is unreadable or is not
    /// a recognised config version.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read policy file {}: {e}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| format!("Invalid policy file {}: {e}", path.display()))
    }

    /// Writes the policies to `path`, tagged with the current config version.
    ///
    /// # Errors
    ///
    /// Returns a message if encoding or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Cannot encode policies: {e}"))?;
        std::fs::write(path, content)
            .map_err(|e| format!("Cannot write policy file {}: {e}", path.display()))
    }

    /// Returns `true` if duplicate control identifiers are rejected.
    #[must_use]
    pub fn rejects_duplicate_controls(&self) -> bool {
        self.duplicate_controls == DuplicateControls::Reject
    }

    /// Returns `true` if a section may only collide with another section.
    #[must_use]
    pub fn requires_same_kind_sections(&self) -> bool {
        self.section_collisions == SectionCollisions::SameKindOnly
    }
}

/// Policy for controls whose identifier is already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateControls {
    /// Attach the control next to the existing node.
    #[default]
    Append,
    /// Fail with [`InsertError::DuplicateId`](crate::InsertError::DuplicateId).
    Reject,
}

/// Policy for sections whose identifier is already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionCollisions {
    /// Any existing node with the identifier counts as the section.
    #[default]
    Idempotent,
    /// Only an existing section counts; any other kind is an
    /// [`InsertError::KindConflict`](crate::InsertError::KindConflict).
    SameKindOnly,
}

/// On-disk layouts of [`Config`], selected by the `_version` key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        duplicate_controls: DuplicateControls,

        #[serde(default)]
        section_collisions: SectionCollisions,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                duplicate_controls,
                section_collisions,
            } => Self {
                duplicate_controls,
                section_collisions,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        let Config {
            duplicate_controls,
            section_collisions,
        } = config;
        Self::V1 {
            duplicate_controls,
            section_collisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let config = Config::default();
        assert!(!config.rejects_duplicate_controls());
        assert!(!config.requires_same_kind_sections());
    }

    #[test]
    fn version_only_uses_defaults() {
        let config: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_strict_policies() {
        let config: Config = toml::from_str(
            r#"
_version = "1"
duplicate_controls = "reject"
section_collisions = "same-kind-only"
"#,
        )
        .unwrap();
        assert!(config.rejects_duplicate_controls());
        assert!(config.requires_same_kind_sections());
    }

    #[test]
    fn missing_version_is_an_error() {
        let result: Result<Config, _> = toml::from_str(r#"duplicate_controls = "reject""#);
        assert!(result.is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            duplicate_controls: DuplicateControls::Reject,
            section_collisions: SectionCollisions::Idempotent,
        };

        config.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"_version = "1""#));
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let error = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(error.starts_with("Cannot read policy file"));
        assert!(error.contains("absent.toml"));
    }

    #[test]
    fn load_reports_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, r#"_version = "9""#).unwrap();

        let error = Config::load(&path).unwrap_err();
        assert!(error.starts_with("Invalid policy file"));
    }
}
