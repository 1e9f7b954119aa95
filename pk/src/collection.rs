//! Named prompt collections and prompt sets

use std::collections::HashMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::entry::PromptEntry;

/// Mapping from prompt name to entry
///
/// Names compare case-insensitively. Iteration follows insertion order, which
/// for scanned collections is scan order (shallowest path first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptCollection {
    /// Display name and entry, in insertion order
    entries: Vec<(String, PromptEntry)>,
    /// Folded name -> position in `entries`
    index: HashMap<String, usize>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl PromptCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, returning the replaced entry
    ///
    /// A replaced name keeps its position but takes the new display name.
    pub fn insert(&mut self, name: impl Into<String>, entry: PromptEntry) -> Option<PromptEntry> {
        let name = name.into();
        match self.index.get(&fold(&name)) {
            Some(&pos) => {
                let slot = &mut self.entries[pos];
                slot.0 = name;
                Some(std::mem::replace(&mut slot.1, entry))
            }
            None => {
                self.index.insert(fold(&name), self.entries.len());
                self.entries.push((name, entry));
                None
            }
        }
    }

    /// Insert only when the name is not present yet; returns whether it was inserted
    pub fn insert_if_absent(&mut self, name: impl Into<String>, entry: PromptEntry) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.insert(name, entry);
        true
    }

    pub fn get(&self, name: &str) -> Option<&PromptEntry> {
        self.index.get(&fold(name)).map(|&pos| &self.entries[pos].1)
    }

    /// Entry together with its display name
    pub fn get_key_value(&self, name: &str) -> Option<(&str, &PromptEntry)> {
        self.index.get(&fold(name)).map(|&pos| {
            let (name, entry) = &self.entries[pos];
            (name.as_str(), entry)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&fold(name))
    }

    /// Display names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PromptEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PromptCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// One directory's resolved prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSet {
    pub name: String,
    pub prompts: PromptCollection,
}

impl PromptSet {
    pub fn new(name: impl Into<String>, prompts: PromptCollection) -> Self {
        Self {
            name: name.into(),
            prompts,
        }
    }

    pub fn get(&self, key: &str) -> Option<&PromptEntry> {
        self.prompts.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PromptFormat;

    fn plain(text: &str) -> PromptEntry {
        PromptEntry::new(text, PromptFormat::Plain)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut prompts = PromptCollection::new();
        prompts.insert("System", plain("sys"));

        assert!(prompts.contains("system"));
        assert!(prompts.contains("SYSTEM"));
        assert_eq!(prompts.get("sYsTeM").map(|e| e.text()), Some("sys"));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut prompts = PromptCollection::new();
        prompts.insert("system", plain("one"));
        prompts.insert("instructions", plain("two"));

        let old = prompts.insert("SYSTEM", plain("three"));
        assert_eq!(old, Some(plain("one")));
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts.names().collect::<Vec<_>>(), vec!["SYSTEM", "instructions"]);
        assert_eq!(prompts.get("system").map(|e| e.text()), Some("three"));
    }

    #[test]
    fn test_get_key_value_returns_display_name() {
        let mut prompts = PromptCollection::new();
        prompts.insert("System", PromptEntry::new("S", PromptFormat::Plain));

        assert_eq!(prompts.get_key_value("SYSTEM").map(|(name, _)| name), Some("System"));
        assert!(prompts.get_key_value("missing").is_none());
    }

    #[test]
    fn test_insert_if_absent() {
        let mut prompts = PromptCollection::new();
        assert!(prompts.insert_if_absent("a", plain("first")));
        assert!(!prompts.insert_if_absent("A", plain("second")));
        assert_eq!(prompts.get("a").map(|e| e.text()), Some("first"));
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let mut prompts = PromptCollection::new();
        prompts.insert("b", plain("B"));
        prompts.insert("a", plain("A"));

        let json = serde_json::to_string(&prompts).unwrap();
        assert!(json.find("\"b\"").unwrap() < json.find("\"a\"").unwrap());
        assert!(json.contains("\"format\":\"plain\""));
    }
}
