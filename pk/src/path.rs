//! Selection paths
//!
//! A path string like `CustomerService/Refund/system` is parsed once into a
//! [`PromptPath`] variant. What a single segment means depends on the scope:
//! a prompt name in the flat prompts folder, or a set name in the set tree.

use tracing::debug;

use crate::error::PromptError;

/// Selects every prompt of the flat prompts folder
pub const ALL_PROMPTS: &str = "*";

/// What a path is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// The flat (recursively scanned) prompts folder
    Prompts,
    /// The prompt set tree
    Sets,
}

/// A parsed selection path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPath {
    /// `*` in the prompts folder
    AllPrompts,
    /// `name` in the prompts folder
    SinglePrompt(String),
    /// `Set` in the set tree
    SetRoot(String),
    /// `Set/Sub`
    SetSubset(String, String),
    /// `Set/Sub/prompt`
    SetSubsetPrompt(String, String, String),
}

impl PromptPath {
    /// Parse a `/`- or `\`-separated path of one to three segments
    pub fn parse(input: &str, scope: PathScope) -> Result<Self, PromptError> {
        debug!(%input, ?scope, "PromptPath::parse: called");
        let invalid = |reason: &str| PromptError::InvalidPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim().trim_matches(|c| c == '/' || c == '\\');
        if trimmed.is_empty() {
            return Err(invalid("path is empty"));
        }

        let segments: Vec<String> = trimmed.split(['/', '\\']).map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("path has an empty segment"));
        }

        let path = match (scope, segments.as_slice()) {
            (PathScope::Prompts, [name]) if name == ALL_PROMPTS => Self::AllPrompts,
            (PathScope::Prompts, [name]) => Self::SinglePrompt(name.clone()),
            (PathScope::Prompts, _) => return Err(invalid("prompt folder paths have a single segment")),
            (PathScope::Sets, [set]) => Self::SetRoot(set.clone()),
            (PathScope::Sets, [set, sub]) => Self::SetSubset(set.clone(), sub.clone()),
            (PathScope::Sets, [set, sub, prompt]) => Self::SetSubsetPrompt(set.clone(), sub.clone(), prompt.clone()),
            (PathScope::Sets, _) => return Err(invalid("set paths have at most three segments")),
        };

        debug!(?path, "PromptPath::parse: parsed");
        Ok(path)
    }

    /// Whether the path names a single prompt rather than a set
    pub fn is_single(&self) -> bool {
        matches!(self, Self::SinglePrompt(_) | Self::SetSubsetPrompt(..))
    }
}

impl std::fmt::Display for PromptPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllPrompts => write!(f, "{}", ALL_PROMPTS),
            Self::SinglePrompt(name) | Self::SetRoot(name) => write!(f, "{}", name),
            Self::SetSubset(set, sub) => write!(f, "{}/{}", set, sub),
            Self::SetSubsetPrompt(set, sub, prompt) => write!(f, "{}/{}/{}", set, sub, prompt),
        }
    }
}
