use crate::mutation::InsertPosition;
use crate::path::{AddressingScheme, NodePath, Path};
use crate::report::OutputFormat;
use serde::Deserialize;
use std::fmt;

/// Largest accepted `diagnostics.context_radius`.
pub const MAX_CONTEXT_RADIUS: usize = 10;

/// Tool settings, usually from `swift-surgeon.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SurgeonConfig {
    #[serde(default)]
    pub diagnostics: DiagnosticsSettings,
    #[serde(default)]
    pub mutation: MutationSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsSettings {
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,
    #[serde(default = "default_true")]
    pub reposition_unexpected_code: bool,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            context_radius: default_context_radius(),
            reposition_unexpected_code: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MutationSettings {
    #[serde(default = "default_true")]
    pub allow_item_swap: bool,
}

impl Default for MutationSettings {
    fn default() -> Self {
        Self {
            allow_item_swap: true,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_context_radius() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl SurgeonConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.diagnostics.context_radius > MAX_CONTEXT_RADIUS {
            issues.push(ValidationIssue::OutOfRange {
                field: "diagnostics.context_radius",
                message: format!(
                    "{} exceeds the maximum of {MAX_CONTEXT_RADIUS}",
                    self.diagnostics.context_radius
                ),
            });
        }
        ValidationError::from_issues(issues)
    }
}

/// A list of mutation steps applied in order to one document.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditScript {
    #[serde(default)]
    pub meta: ScriptMetadata,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScriptMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One step. Exactly one of `path` (token path) or `declaration` names the
/// target, and it is resolved against the tree the previous step produced.
#[derive(Debug, Deserialize, Clone)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub declaration: Option<String>,
    pub operation: Operation,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    Replace {
        text: String,
    },
    Delete,
    Insert {
        text: String,
        #[serde(default)]
        position: InsertPosition,
    },
    /// Rewrite the documentation comment; no text removes it.
    Document {
        #[serde(default)]
        text: Option<String>,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Replace { .. } => "replace",
            Operation::Delete => "delete",
            Operation::Insert { .. } => "insert",
            Operation::Document { .. } => "document",
        }
    }
}

impl Step {
    /// The addressed node. Call after validation; a malformed path still
    /// comes back as `NodeNotFound`.
    pub fn target(&self) -> Result<NodePath, crate::mutation::NodeOperationError> {
        match (&self.path, &self.declaration) {
            (Some(path), _) => NodePath::parse(AddressingScheme::Token, path),
            (None, Some(declaration)) => NodePath::parse(AddressingScheme::Declaration, declaration),
            (None, None) => Err(crate::mutation::NodeOperationError::not_found("")),
        }
    }
}

impl EditScript {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.steps.is_empty() {
            issues.push(ValidationIssue::EmptyStepList);
        }

        for step in &self.steps {
            let id = || (!step.id.trim().is_empty()).then(|| step.id.clone());
            if step.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: None,
                    field: "id",
                });
            }
            match (&step.path, &step.declaration) {
                (None, None) => issues.push(ValidationIssue::MissingField {
                    step_id: id(),
                    field: "path",
                }),
                (Some(_), Some(_)) => issues.push(ValidationIssue::InvalidCombo {
                    step_id: id(),
                    message: "path and declaration cannot both be set".to_string(),
                }),
                (Some(path), None) | (None, Some(path)) => {
                    if path.parse::<Path>().is_err() {
                        issues.push(ValidationIssue::InvalidCombo {
                            step_id: id(),
                            message: format!("'{path}' is not a dot-separated list of positive numbers"),
                        });
                    } else if step.path.is_some() && path.contains('.') {
                        issues.push(ValidationIssue::InvalidCombo {
                            step_id: id(),
                            message: format!("token path '{path}' must have a single segment"),
                        });
                    }
                }
            }
            match &step.operation {
                Operation::Replace { text } | Operation::Insert { text, .. } => {
                    if text.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            step_id: id(),
                            field: "operation.text",
                        });
                    }
                }
                Operation::Delete | Operation::Document { .. } => {}
            }
        }

        ValidationError::from_issues(issues)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    fn from_issues(issues: Vec<ValidationIssue>) -> Result<(), ValidationError> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyStepList,
    MissingField {
        step_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        step_id: Option<String>,
        message: String,
    },
    OutOfRange {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyStepList => write!(f, "edit script contains no steps"),
            ValidationIssue::MissingField { step_id, field } => match step_id {
                Some(id) => write!(f, "step '{id}' missing required field '{field}'"),
                None => write!(f, "step missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { step_id, message } => match step_id {
                Some(id) => write!(f, "step '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid step configuration: {message}"),
            },
            ValidationIssue::OutOfRange { field, message } => {
                write!(f, "'{field}' out of range: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config: SurgeonConfig = toml_edit::de::from_str("").unwrap();
        assert_eq!(config, SurgeonConfig::default());
        assert_eq!(config.diagnostics.context_radius, 1);
        assert!(config.diagnostics.reposition_unexpected_code);
        assert!(config.mutation.allow_item_swap);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn config_radius_is_bounded() {
        let config: SurgeonConfig =
            toml_edit::de::from_str("[diagnostics]\ncontext_radius = 11\n").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'diagnostics.context_radius' out of range: 11 exceeds the maximum of 10"
        );
    }

    #[test]
    fn operations_are_tagged() {
        let script: EditScript = toml_edit::de::from_str(
            r#"
[[steps]]
id = "a"
path = "3"
operation = { type = "replace", text = "y" }

[[steps]]
id = "b"
declaration = "1.2"
operation = { type = "insert", text = "let z = 0", position = "before" }

[[steps]]
id = "c"
declaration = "1"
operation = { type = "document" }
"#,
        )
        .unwrap();
        assert!(script.validate().is_ok());
        assert_eq!(script.steps[0].operation, Operation::Replace { text: "y".into() });
        assert_eq!(
            script.steps[1].operation,
            Operation::Insert {
                text: "let z = 0".into(),
                position: InsertPosition::Before
            }
        );
        assert_eq!(script.steps[2].operation, Operation::Document { text: None });
        assert_eq!(
            script.steps[1].target().unwrap(),
            NodePath::parse(AddressingScheme::Declaration, "1.2").unwrap()
        );
    }

    #[test]
    fn validation_collects_every_issue() {
        let script: EditScript = toml_edit::de::from_str(
            r#"
[[steps]]
id = ""
operation = { type = "delete" }

[[steps]]
id = "both"
path = "1"
declaration = "1"
operation = { type = "delete" }

[[steps]]
id = "nested-token"
path = "1.2"
operation = { type = "replace", text = " " }
"#,
        )
        .unwrap();
        let err = script.validate().unwrap_err();
        assert_eq!(err.issues.len(), 5);
        assert!(err.to_string().contains("step 'both' has invalid configuration"));
        assert!(err.to_string().contains("token path '1.2' must have a single segment"));
    }

    #[test]
    fn empty_script_is_invalid() {
        let err = EditScript::default().validate().unwrap_err();
        assert_eq!(err.issues, vec![ValidationIssue::EmptyStepList]);
    }
}
