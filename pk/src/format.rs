//! Content format classification by file extension

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Content format of a prompt file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptFormat {
    /// `.txt`, `.prompt`
    Plain,
    /// `.md`, `.prompt.md`
    Markdown,
    /// `.jinja`, `.jinja2`
    Template,
    /// `.yml`, `.yaml`, `.json`
    StructuredData,
    /// Anything else
    Unknown,
}

impl PromptFormat {
    /// Get the display name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Markdown => "markdown",
            Self::Template => "template",
            Self::StructuredData => "structured-data",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PromptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classify a file extension
///
/// Case-insensitive, and the leading dot is optional. Unknown extensions map to
/// [`PromptFormat::Unknown`] rather than failing.
pub fn classify(extension: &str) -> PromptFormat {
    let ext = normalize_extension(extension);
    let format = match ext.as_str() {
        ".jinja" | ".jinja2" => PromptFormat::Template,
        ".yml" | ".yaml" | ".json" => PromptFormat::StructuredData,
        ".md" | ".prompt.md" => PromptFormat::Markdown,
        ".txt" | ".prompt" => PromptFormat::Plain,
        _ => PromptFormat::Unknown,
    };
    debug!(%extension, %format, "classify: resolved");
    format
}

/// Lowercase an extension and make sure it starts with a dot
pub fn normalize_extension(extension: &str) -> String {
    let ext = extension.trim().to_ascii_lowercase();
    if ext.starts_with('.') { ext } else { format!(".{}", ext) }
}

/// Split a file name into `(stem, extension)` using the recognized extensions
///
/// The longest matching extension wins, so `system.prompt.md` splits into
/// `("system", ".prompt.md")` when `.prompt.md` is recognized. Returns `None`
/// when no recognized extension matches or the stem would be empty.
pub fn split_file_name<S: AsRef<str>>(file_name: &str, extensions: &[S]) -> Option<(String, String)> {
    let lower = file_name.to_ascii_lowercase();

    let best = extensions
        .iter()
        .map(|e| normalize_extension(e.as_ref()))
        .filter(|ext| lower.len() > ext.len() && lower.ends_with(ext.as_str()))
        .max_by_key(|ext| ext.len())?;

    let split_at = file_name.len() - best.len();
    let stem = file_name[..split_at].to_string();
    debug!(%file_name, %stem, extension = %best, "split_file_name: matched");
    Some((stem, best))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify(".jinja"), PromptFormat::Template);
        assert_eq!(classify(".jinja2"), PromptFormat::Template);
        assert_eq!(classify(".yml"), PromptFormat::StructuredData);
        assert_eq!(classify(".yaml"), PromptFormat::StructuredData);
        assert_eq!(classify(".md"), PromptFormat::Markdown);
        assert_eq!(classify(".prompt.md"), PromptFormat::Markdown);
        assert_eq!(classify(".txt"), PromptFormat::Plain);
        assert_eq!(classify(".prompt"), PromptFormat::Plain);
    }

    #[test]
    fn test_classify_is_case_insensitive_and_dot_optional() {
        assert_eq!(classify(".MD"), PromptFormat::Markdown);
        assert_eq!(classify("Jinja2"), PromptFormat::Template);
        assert_eq!(classify("txt"), PromptFormat::Plain);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify(".rs"), PromptFormat::Unknown);
        assert_eq!(classify(""), PromptFormat::Unknown);
    }

    #[test]
    fn test_split_prefers_longest_extension() {
        let exts = [".md", ".prompt.md", ".prompt"];
        assert_eq!(
            split_file_name("system.prompt.md", &exts),
            Some(("system".to_string(), ".prompt.md".to_string()))
        );
        assert_eq!(
            split_file_name("notes.md", &exts),
            Some(("notes".to_string(), ".md".to_string()))
        );
    }

    #[test]
    fn test_split_keeps_stem_case() {
        let exts = [".txt"];
        assert_eq!(
            split_file_name("System.TXT", &exts),
            Some(("System".to_string(), ".txt".to_string()))
        );
    }

    #[test]
    fn test_split_rejects_unrecognized_and_bare_extension() {
        let exts = [".txt"];
        assert_eq!(split_file_name("main.rs", &exts), None);
        assert_eq!(split_file_name(".txt", &exts), None);
    }
}
