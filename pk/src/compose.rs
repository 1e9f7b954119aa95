//! Prompt composition
//!
//! Joins the prompts of a set into one string. Key order comes from the
//! [`CompositionOrder`]; entries missing from the set are taken from an
//! optional fallback set, and keys found in neither are skipped.
//!
//! The separator may contain [`NAME_PLACEHOLDER`], in which case it becomes a
//! per-entry header:
//!
//! ```text
//! separator: "\n\n{name}:\n"
//!
//! System:
//! You are a support agent.
//!
//! Instructions:
//! Handle refunds politely.
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::PromptSet;
use crate::entry::PromptEntry;
use crate::error::PromptError;

/// Token replaced by the capitalized prompt name in header separators
pub const NAME_PLACEHOLDER: &str = "{name}";

const DEFAULT_SEPARATOR: &str = "\n";

/// How composed keys are ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositionOrder {
    /// Configured keys first, then the remaining set keys in collection order
    #[default]
    #[serde(rename = "configured")]
    ConfiguredOrder,
    /// Set keys sorted case-insensitively
    #[serde(rename = "lexical")]
    LexicalOrder,
    /// Set keys in collection order
    #[serde(rename = "insertion")]
    InsertionOrder,
}

impl std::str::FromStr for CompositionOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "configured" => Ok(Self::ConfiguredOrder),
            "lexical" => Ok(Self::LexicalOrder),
            "insertion" => Ok(Self::InsertionOrder),
            _ => Err(format!("Unknown order: {}. Use: configured, lexical, or insertion", s)),
        }
    }
}

impl std::fmt::Display for CompositionOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfiguredOrder => write!(f, "configured"),
            Self::LexicalOrder => write!(f, "lexical"),
            Self::InsertionOrder => write!(f, "insertion"),
        }
    }
}

/// Per-call composition options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    pub order: CompositionOrder,
    /// Priority order of prompt names (used by [`CompositionOrder::ConfiguredOrder`])
    pub ordered_keys: Vec<String>,
    /// Overrides the composer's configured separator template
    pub separator: Option<String>,
}

impl ComposeOptions {
    /// Configured order with the given key priority
    pub fn configured<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: CompositionOrder::ConfiguredOrder,
            ordered_keys: keys.into_iter().map(Into::into).collect(),
            separator: None,
        }
    }

    pub fn with_order(mut self, order: CompositionOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }
}

/// Joins prompt sets into text
#[derive(Debug, Clone, Default)]
pub struct Composer {
    /// Separator or header template used when a call does not give one
    template: Option<String>,
}

impl Composer {
    pub fn new(template: Option<String>) -> Self {
        Self { template }
    }

    /// Compose `set`, resolving missing keys from `fallback`
    pub fn combine(&self, set: &PromptSet, fallback: Option<&PromptSet>, options: &ComposeOptions) -> String {
        debug!(
            set = %set.name,
            fallback = ?fallback.map(|f| f.name.as_str()),
            order = %options.order,
            "Composer::combine: called"
        );

        let separator = options
            .separator
            .as_deref()
            .or(self.template.as_deref())
            .unwrap_or(DEFAULT_SEPARATOR);
        let header_mode = separator.contains(NAME_PLACEHOLDER);

        let mut out = String::new();
        let mut composed = 0usize;

        for key in key_order(set, fallback, options) {
            let Some((name, entry)) = resolve(&key, set, fallback) else {
                debug!(%key, "Composer::combine: key in neither set nor fallback, skipping");
                continue;
            };

            if header_mode {
                let header = separator.replace(NAME_PLACEHOLDER, &capitalize_key(name));
                if composed == 0 {
                    out.push_str(header.trim_start());
                } else {
                    out.push_str(&header);
                }
            } else if composed > 0 {
                out.push_str(separator);
            }

            out.push_str(entry.text());
            composed += 1;
        }

        debug!(composed, len = out.len(), "Composer::combine: complete");
        out.trim_end().to_string()
    }

    /// Compose a set looked up by name
    ///
    /// Fails with [`PromptError::SetNotFound`] when `set_name` is not in `sets`.
    pub fn combine_named(
        &self,
        sets: &BTreeMap<String, PromptSet>,
        set_name: &str,
        fallback: Option<&PromptSet>,
        options: &ComposeOptions,
    ) -> Result<String, PromptError> {
        debug!(%set_name, "Composer::combine_named: called");
        let set = sets
            .get(set_name)
            .or_else(|| {
                sets.iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(set_name))
                    .map(|(_, set)| set)
            })
            .ok_or_else(|| PromptError::SetNotFound {
                name: set_name.to_string(),
            })?;
        Ok(self.combine(set, fallback, options))
    }
}

/// Entry for `key` and the name it was stored under
fn resolve<'a>(key: &str, set: &'a PromptSet, fallback: Option<&'a PromptSet>) -> Option<(&'a str, &'a PromptEntry)> {
    set.prompts
        .get_key_value(key)
        .or_else(|| fallback.and_then(|f| f.prompts.get_key_value(key)))
}

/// Final key order, without case-insensitive duplicates
fn key_order(set: &PromptSet, fallback: Option<&PromptSet>, options: &ComposeOptions) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut push = |key: &str| {
        if !keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            keys.push(key.to_string());
        }
    };

    match options.order {
        CompositionOrder::ConfiguredOrder => {
            for key in &options.ordered_keys {
                if resolve(key, set, fallback).is_some() {
                    push(key.as_str());
                }
            }
            set.prompts.names().for_each(&mut push);
        }
        CompositionOrder::LexicalOrder => {
            let mut names: Vec<&str> = set.prompts.names().collect();
            names.sort_by_key(|n| n.to_ascii_lowercase());
            names.into_iter().for_each(&mut push);
        }
        CompositionOrder::InsertionOrder => {
            set.prompts.names().for_each(&mut push);
        }
    }

    keys
}

/// Human-readable header name: the part before the first `.`, capitalized
pub fn capitalize_key(key: &str) -> String {
    let head = key.split('.').next().unwrap_or(key);
    let mut chars = head.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::PromptCollection;
    use crate::format::PromptFormat;
    use proptest::prelude::*;

    fn set(name: &str, entries: &[(&str, &str)]) -> PromptSet {
        let mut prompts = PromptCollection::new();
        for (key, text) in entries {
            prompts.insert(*key, PromptEntry::new(*text, PromptFormat::Markdown));
        }
        PromptSet::new(name, prompts)
    }

    #[test]
    fn test_default_separator_is_newline() {
        let s = set("s", &[("a", "A"), ("b", "B")]);
        assert_eq!(Composer::default().combine(&s, None, &ComposeOptions::default()), "A\nB");
    }

    #[test]
    fn test_configured_order_with_fallback() {
        let sales = set("Sales/Root", &[("instructions", "Sales Instructions")]);
        let root = set("Root/Root", &[("system", "Root System")]);

        let out = Composer::default().combine(
            &sales,
            Some(&root),
            &ComposeOptions::configured(["system", "instructions"]),
        );
        assert_eq!(out, "Root System\nSales Instructions");
    }

    #[test]
    fn test_fallback_keys_need_configuration() {
        let sales = set("Sales/Root", &[("instructions", "I")]);
        let root = set("Root/Root", &[("system", "S")]);

        let out = Composer::default().combine(&sales, Some(&root), &ComposeOptions::default());
        assert_eq!(out, "I");
    }

    #[test]
    fn test_configured_order_is_priority_not_filter() {
        let s = set("s", &[("a", "A"), ("b", "B"), ("c", "C")]);
        let out = Composer::default().combine(&s, None, &ComposeOptions::configured(["c", "missing"]));
        assert_eq!(out, "C\nA\nB");
    }

    #[test]
    fn test_set_entry_beats_fallback() {
        let s = set("s", &[("system", "Own")]);
        let fb = set("fb", &[("system", "Fallback")]);
        let out = Composer::default().combine(&s, Some(&fb), &ComposeOptions::configured(["system"]));
        assert_eq!(out, "Own");
    }

    #[test]
    fn test_lexical_and_insertion_order() {
        let s = set("s", &[("beta", "B"), ("Alpha", "A"), ("gamma", "G")]);
        let composer = Composer::default();

        let lexical = ComposeOptions::default().with_order(CompositionOrder::LexicalOrder);
        assert_eq!(composer.combine(&s, None, &lexical), "A\nB\nG");

        let insertion = ComposeOptions::configured(["gamma"]).with_order(CompositionOrder::InsertionOrder);
        assert_eq!(composer.combine(&s, None, &insertion), "B\nA\nG");
    }

    #[test]
    fn test_header_template() {
        let s = set("s", &[("system.v2", "Be kind."), ("instructions", "Help.")]);
        let composer = Composer::new(Some("\n\n{name}:\n".to_string()));

        let out = composer.combine(&s, None, &ComposeOptions::default());
        assert_eq!(out, "System:\nBe kind.\n\nInstructions:\nHelp.");
    }

    #[test]
    fn test_header_uses_file_spelling() {
        let s = set("s", &[("system", "S"), ("examples.v2", "E")]);
        let options = ComposeOptions::configured(["SYSTEM", "EXAMPLES.V2"]).with_separator("\n{name}:\n");

        let out = Composer::default().combine(&s, None, &options);
        assert_eq!(out, "System:\nS\nExamples:\nE");
    }

    #[test]
    fn test_explicit_separator_overrides_template() {
        let s = set("s", &[("a", "A"), ("b", "B")]);
        let composer = Composer::new(Some("\n\n{name}:\n".to_string()));

        let out = composer.combine(&s, None, &ComposeOptions::default().with_separator(" | "));
        assert_eq!(out, "A | B");
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let s = set("s", &[("a", "A\n"), ("b", "B\n\n")]);
        assert_eq!(Composer::default().combine(&s, None, &ComposeOptions::default()), "A\n\nB");
    }

    #[test]
    fn test_empty_set() {
        let s = set("s", &[]);
        assert_eq!(Composer::default().combine(&s, None, &ComposeOptions::default()), "");
    }

    #[test]
    fn test_combine_named_missing_set() {
        let sets = BTreeMap::new();
        let result = Composer::default().combine_named(&sets, "Nope", None, &ComposeOptions::default());
        assert!(matches!(result, Err(PromptError::SetNotFound { name }) if name == "Nope"));
    }

    #[test]
    fn test_combine_named_case_insensitive() {
        let mut sets = BTreeMap::new();
        sets.insert("Sales/Root".to_string(), set("Sales/Root", &[("a", "A")]));
        let out = Composer::default()
            .combine_named(&sets, "sales/root", None, &ComposeOptions::default())
            .unwrap();
        assert_eq!(out, "A");
    }

    #[test]
    fn test_capitalize_key() {
        assert_eq!(capitalize_key("system"), "System");
        assert_eq!(capitalize_key("examples.few-shot"), "Examples");
        assert_eq!(capitalize_key(""), "");
        assert_eq!(capitalize_key("éclair"), "Éclair");
    }

    #[test]
    fn test_order_from_str() {
        assert_eq!("Lexical".parse::<CompositionOrder>(), Ok(CompositionOrder::LexicalOrder));
        assert!("random".parse::<CompositionOrder>().is_err());
    }

    proptest! {
        #[test]
        fn prop_configured_keys_lead_in_order(n in 1usize..8, picks in proptest::collection::vec(0usize..10, 0..8)) {
            let mut prompts = PromptCollection::new();
            for i in 0..n {
                prompts.insert(format!("k{}", i), PromptEntry::new(format!("<{}>", i), PromptFormat::Plain));
            }
            let s = PromptSet::new("s", prompts);
            let ordered: Vec<String> = picks.iter().map(|i| format!("k{}", i)).collect();

            let out = Composer::default().combine(&s, None, &ComposeOptions::configured(ordered));

            for i in 0..n {
                prop_assert_eq!(out.matches(&format!("<{}>", i)).count(), 1);
            }

            let mut expected: Vec<usize> = Vec::new();
            for &i in &picks {
                if i < n && !expected.contains(&i) {
                    expected.push(i);
                }
            }
            let rest: Vec<usize> = (0..n).filter(|i| !expected.contains(i)).collect();
            let positions: Vec<usize> = expected
                .iter()
                .chain(rest.iter())
                .map(|i| out.find(&format!("<{}>", i)).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
