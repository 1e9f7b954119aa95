//! Structured prompt definitions
//!
//! A structured-data prompt file (YAML, or JSON since JSON is valid YAML)
//! describes a prompt together with its arguments:
//!
//! ```yaml
//! name: refund
//! description: Answer a refund request
//! arguments:
//!   - name: customer
//!     required: true
//!   - name: tone
//!     default: friendly
//! model:
//!   name: gpt-4o
//!   temperature: 0.2
//! template: |
//!   Write a {{tone}} reply to {{customer}}.
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entry::PromptEntry;
use crate::error::PromptError;

/// One argument accepted by a prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ArgumentSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: Option<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: false,
            default,
        }
    }
}

/// Model hints carried alongside a definition; passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(rename = "max-tokens", alias = "max_tokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A prompt parsed from a structured-data entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Defaults to the file's prompt name when omitted
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelHints>,

    /// Template text handed to the renderer
    #[serde(alias = "prompt")]
    pub template: String,
}

impl PromptDefinition {
    /// Parse a definition out of an entry's text
    pub fn from_entry(name: &str, entry: &PromptEntry) -> Result<Self, PromptError> {
        debug!(%name, format = %entry.format(), "PromptDefinition::from_entry: called");
        let mut definition: Self =
            serde_yaml::from_str(entry.text()).map_err(|source| PromptError::Definition { source })?;
        if definition.name.is_empty() {
            definition.name = name.to_string();
        }
        debug!(name = %definition.name, arguments = definition.arguments.len(), "PromptDefinition::from_entry: parsed");
        Ok(definition)
    }

    /// Names of arguments that must be supplied
    pub fn required_arguments(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().filter(|a| a.required).map(|a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PromptFormat;

    #[test]
    fn test_parse_yaml_definition() {
        let entry = PromptEntry::new(
            r#"
description: Answer a refund request
arguments:
  - name: customer
    required: true
  - name: tone
    default: friendly
model:
  name: gpt-4o
  temperature: 0.2
  max-tokens: 512
template: "Write a {{tone}} reply to {{customer}}."
"#,
            PromptFormat::StructuredData,
        );

        let def = PromptDefinition::from_entry("refund", &entry).unwrap();
        assert_eq!(def.name, "refund");
        assert_eq!(def.arguments.len(), 2);
        assert_eq!(def.required_arguments().collect::<Vec<_>>(), vec!["customer"]);
        assert_eq!(def.arguments[1].default.as_deref(), Some("friendly"));
        let model = def.model.unwrap();
        assert_eq!(model.name.as_deref(), Some("gpt-4o"));
        assert_eq!(model.max_tokens, Some(512));
    }

    #[test]
    fn test_parse_json_definition_with_prompt_alias() {
        let entry = PromptEntry::new(
            r#"{"name": "greet", "prompt": "Hello {{who}}", "arguments": [{"name": "who", "required": true}]}"#,
            PromptFormat::StructuredData,
        );

        let def = PromptDefinition::from_entry("file-name", &entry).unwrap();
        assert_eq!(def.name, "greet");
        assert_eq!(def.template, "Hello {{who}}");
    }

    #[test]
    fn test_missing_template_is_error() {
        let entry = PromptEntry::new("description: no template here", PromptFormat::StructuredData);
        let result = PromptDefinition::from_entry("x", &entry);
        assert!(matches!(result, Err(PromptError::Definition { .. })));
    }
}
