//! Prompt entry value type

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::format::PromptFormat;

/// Matches `{{ name }}` placeholders (Handlebars and Jinja share this form)
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}").expect("placeholder regex is valid")
});

/// Handlebars keywords that look like placeholders but never name an argument
const KEYWORDS: &[&str] = &["else", "this"];

fn is_keyword(name: &str) -> bool {
    let head = name.split('.').next().unwrap_or(name);
    KEYWORDS.contains(&head)
}

/// The text of a single prompt file and its content format
///
/// Entries are immutable. Inheritance across folder levels clones them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptEntry {
    text: String,
    format: PromptFormat,
}

impl PromptEntry {
    pub fn new(text: impl Into<String>, format: PromptFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> PromptFormat {
        self.format
    }

    /// Distinct placeholder names in order of first appearance
    ///
    /// Block helpers (`{{#if}}`), `{{else}}`, `{{this}}` and `@`-variables are
    /// not placeholders.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for cap in PLACEHOLDER.captures_iter(&self.text) {
            let name = &cap[1];
            if is_keyword(name) {
                continue;
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn has_variables(&self) -> bool {
        PLACEHOLDER
            .captures_iter(&self.text)
            .any(|cap| !is_keyword(&cap[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_in_first_appearance_order() {
        let entry = PromptEntry::new(
            "Hello {{ customer }}, order {{order_id}} for {{customer}}",
            PromptFormat::Template,
        );
        assert_eq!(entry.variables(), vec!["customer".to_string(), "order_id".to_string()]);
        assert!(entry.has_variables());
    }

    #[test]
    fn test_no_variables() {
        let entry = PromptEntry::new("You are a helpful assistant.", PromptFormat::Plain);
        assert!(entry.variables().is_empty());
        assert!(!entry.has_variables());
    }

    #[test]
    fn test_handlebars_keywords_are_not_variables() {
        let entry = PromptEntry::new(
            "{{#if tone}}Use a {{tone}} tone.{{else}}Be neutral.{{/if}} {{#each items}}{{this}} {{@index}}{{/each}}",
            PromptFormat::Template,
        );
        assert_eq!(entry.variables(), vec!["tone".to_string()]);

        let only_keywords = PromptEntry::new("{{else}} {{this.name}}", PromptFormat::Template);
        assert!(!only_keywords.has_variables());
    }

    #[test]
    fn test_single_braces_are_not_placeholders() {
        let entry = PromptEntry::new("Return JSON like {\"a\": 1} or {name}", PromptFormat::Markdown);
        assert!(!entry.has_variables());
    }
}
