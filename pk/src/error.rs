//! Prompt error types

use thiserror::Error;

/// Errors that can occur while resolving, composing or rendering prompts
///
/// Missing folders, missing files and unsupported extensions are not errors;
/// they produce empty results. These variants cover caller misuse and
/// downstream rendering failures.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt set not found: {name}")]
    SetNotFound { name: String },

    #[error("Prompt subset not found: {set}/{subset}")]
    SubsetNotFound { set: String, subset: String },

    #[error("Prompt not found: {name}")]
    PromptNotFound { name: String },

    #[error("Invalid prompt path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Missing required arguments: {}", .names.join(", "))]
    MissingArguments { names: Vec<String> },

    #[error("Invalid prompt definition: {source}")]
    Definition {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Render error: {0}")]
    Render(String),
}

impl PromptError {
    /// Check if this error came from looking up a name that does not exist
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            PromptError::SetNotFound { .. } | PromptError::SubsetNotFound { .. } | PromptError::PromptNotFound { .. }
        )
    }
}
