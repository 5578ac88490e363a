use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::domain::NodeId;

/// A single checkable requirement, e.g. `2.4.3 Ensure IP forwarding is
/// disabled`.
///
/// Controls usually have no children, although nothing prevents a dotted
/// descendant from being attached beneath one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    id: NodeId,
    /// Short human-readable heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Profile level, e.g. `1` or `2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// How to bring a non-compliant system into line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Why the control matters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// How to check compliance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<String>,
    /// Whether the check is automated or manual.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,
}

impl Control {
    /// Creates a control with every metadata field unset.
    #[must_use]
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            level: None,
            remediation: None,
            rationale: None,
            audit: None,
            assessment: None,
        }
    }

    /// The control's dotted identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Builds a control from an untyped key-value mapping.
    ///
    /// Only `id` and the seven metadata keys (`title`, `description`, `level`,
    /// `remediation`, `rationale`, `audit`, `assessment`) are read; any other
    /// key is ignored. Scalar values are stored in their textual form, `null` leaves
    /// the field unset, and nested sequences or mappings are kept as YAML
    /// text.
    ///
    /// ```
    /// use compliance::Control;
    ///
    /// let mapping: serde_yaml::Mapping =
    ///     serde_yaml::from_str("{id: '1.1.1', title: Ensure foo, level: 1, owner: ops}").unwrap();
    /// let control = Control::from_mapping(&mapping).unwrap();
    ///
    /// assert_eq!(control.id(), "1.1.1");
    /// assert_eq!(control.level.as_deref(), Some("1"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`InvalidControl::Missing`] if there is no `id` key or its value
    /// is `null`, and [`InvalidControl::WrongType`] if the `id` is not a
    /// string.
    pub fn from_mapping(mapping: &Mapping) -> Result<Self, InvalidControl> {
        let id = mapping.get("id").cloned().unwrap_or(Value::Null);
        let mut control = Self::try_from(id)?;

        control.title = field_text(mapping, "title");
        control.description = field_text(mapping, "description");
        control.level = field_text(mapping, "level");
        control.remediation = field_text(mapping, "remediation");
        control.rationale = field_text(mapping, "rationale");
        control.audit = field_text(mapping, "audit");
        control.assessment = field_text(mapping, "assessment");

        Ok(control)
    }
}

/// Constructs a control from an untyped identifier value.
///
/// Only string identifiers are accepted. Numbers, booleans and nested values
/// are rejected, since `1.1` read as a float would silently lose its
/// hierarchy.
impl TryFrom<Value> for Control {
    type Error = InvalidControl;

    fn try_from(id: Value) -> Result<Self, Self::Error> {
        match id {
            Value::String(id) => Ok(Self::new(id)),
            Value::Null => Err(InvalidControl::Missing),
            other => Err(InvalidControl::WrongType {
                value: render(&other),
            }),
        }
    }
}

fn field_text(mapping: &Mapping, key: &str) -> Option<String> {
    match mapping.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(render(other)),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Errors raised when a control cannot be constructed.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InvalidControl {
    /// No identifier was supplied.
    #[error("Control ID not set")]
    Missing,

    /// The identifier was supplied but is not a string.
    #[error("Invalid control ID {value}")]
    WrongType {
        /// Textual rendering of the rejected value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn defaults() {
        let control = Control::new("1.1.1");
        assert_eq!(control.id(), "1.1.1");
        assert!(control.title.is_none());
        assert!(control.description.is_none());
        assert!(control.level.is_none());
        assert!(control.remediation.is_none());
        assert!(control.rationale.is_none());
        assert!(control.audit.is_none());
        assert!(control.assessment.is_none());
    }

    #[test]
    fn from_mapping_with_only_id() {
        let control = Control::from_mapping(&mapping("id: '1.1.1'")).unwrap();
        assert_eq!(control, Control::new("1.1.1"));
    }

    #[test]
    fn from_mapping_reads_all_fields() {
        let control = Control::from_mapping(&mapping(
            r"
id: '5.2.1'
title: Ensure sudo is installed
description: sudo allows privilege escalation
level: 1
remediation: apt install sudo
rationale: auditable privilege use
audit: dpkg -s sudo
assessment: Automated
",
        ))
        .unwrap();

        assert_eq!(control.id(), "5.2.1");
        assert_eq!(control.title.as_deref(), Some("Ensure sudo is installed"));
        assert_eq!(
            control.description.as_deref(),
            Some("sudo allows privilege escalation")
        );
        assert_eq!(control.level.as_deref(), Some("1"));
        assert_eq!(control.remediation.as_deref(), Some("apt install sudo"));
        assert_eq!(control.rationale.as_deref(), Some("auditable privilege use"));
        assert_eq!(control.audit.as_deref(), Some("dpkg -s sudo"));
        assert_eq!(control.assessment.as_deref(), Some("Automated"));
    }

    #[test]
    fn from_mapping_ignores_unknown_keys() {
        let control = Control::from_mapping(&mapping(
            "{id: '1.1.1', title: foo, bar: true, extra: metadata}",
        ))
        .unwrap();

        let mut expected = Control::new("1.1.1");
        expected.title = Some("foo".to_string());
        assert_eq!(control, expected);

        let serialized = serde_yaml::to_value(&control).unwrap();
        let keys: Vec<_> = serialized
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["id", "title"]);
    }

    #[test]
    fn from_mapping_does_not_mutate_input() {
        let input = mapping("{id: '1.1.1', title: foo}");
        let before = input.clone();
        Control::from_mapping(&input).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn from_mapping_keeps_nested_values_as_text() {
        let control =
            Control::from_mapping(&mapping("{id: '1.1', audit: [stat /etc/passwd]}")).unwrap();
        assert_eq!(control.audit.as_deref(), Some("- stat /etc/passwd"));
    }

    #[test]
    fn from_mapping_null_field_is_unset() {
        let control = Control::from_mapping(&mapping("{id: '1.1', title: ~}")).unwrap();
        assert!(control.title.is_none());
    }

    #[test_case("{}"; "empty mapping")]
    #[test_case("{title: x}"; "no id key")]
    #[test_case("{id: ~, title: x}"; "null id")]
    fn from_mapping_without_id_fails(yaml: &str) {
        assert_eq!(
            Control::from_mapping(&mapping(yaml)),
            Err(InvalidControl::Missing)
        );
    }

    #[test_case("{id: 1.1}", "1.1"; "float")]
    #[test_case("{id: 1}", "1"; "integer")]
    #[test_case("{id: true}", "true"; "true")]
    #[test_case("{id: false}", "false"; "false")]
    fn from_mapping_with_wrong_id_type_fails(yaml: &str, rendered: &str) {
        assert_eq!(
            Control::from_mapping(&mapping(yaml)),
            Err(InvalidControl::WrongType {
                value: rendered.to_string()
            })
        );
    }

    #[test]
    fn non_string_id_is_rejected() {
        let result = Control::try_from(Value::from(42));
        assert_eq!(
            result,
            Err(InvalidControl::WrongType {
                value: "42".to_string()
            })
        );
    }

    #[test]
    fn string_id_is_accepted() {
        let control = Control::try_from(Value::from("3.2.1")).unwrap();
        assert_eq!(control.id(), "3.2.1");
    }

    #[test]
    fn error_display() {
        assert_eq!(InvalidControl::Missing.to_string(), "Control ID not set");
        assert_eq!(
            InvalidControl::WrongType {
                value: "42".to_string()
            }
            .to_string(),
            "Invalid control ID 42"
        );
    }
}
