//! Prompt set tree
//!
//! Builds a two-level structure from a prompt-set folder:
//!
//! ```text
//! PromptSets/              tree["Root"]["Root"]     (files directly here)
//! └── CustomerService/     tree["CustomerService"]["Root"]
//!     ├── Refund/          tree["CustomerService"]["Refund"]
//!     └── Policy/          tree["CustomerService"]["Policy"]
//! ```
//!
//! Each sub-set inherits its set's `Root` prompts. Under cascade override the
//! sub-set keeps its own same-named prompts; without it the parent wins.
//! Folders nested deeper than a sub-set are not descended into.
//!
//! `Root` is reserved: a real folder with that name (any case) is skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::ROOT_BUCKET;
use crate::collection::{PromptCollection, PromptSet};
use crate::scanner::{ScanOptions, scan_direct};

/// Sub-bucket name -> resolved prompt set
pub type SetBuckets = BTreeMap<String, PromptSet>;

/// Top-level set name -> sub-buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SetTree {
    sets: BTreeMap<String, SetBuckets>,
}

impl SetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a top-level set, exact name first, then case-insensitively
    pub fn get_set(&self, name: &str) -> Option<&SetBuckets> {
        lookup(&self.sets, name)
    }

    /// Look up one bucket of a set
    pub fn get(&self, set: &str, bucket: &str) -> Option<&PromptSet> {
        self.get_set(set).and_then(|buckets| lookup(buckets, bucket))
    }

    /// The synthetic bucket holding files directly under the scan root
    pub fn root(&self) -> Option<&PromptSet> {
        self.get(ROOT_BUCKET, ROOT_BUCKET)
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SetBuckets)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Every bucket of every set keyed by `Set/Bucket`
    pub fn flatten(&self) -> BTreeMap<String, PromptSet> {
        self.sets
            .iter()
            .flat_map(|(set, buckets)| buckets.iter().map(move |(bucket, ps)| (format!("{}/{}", set, bucket), ps.clone())))
            .collect()
    }
}

fn lookup<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(name)
        .or_else(|| map.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v))
}

/// Build the set tree under `root`
///
/// A missing root yields an empty tree.
pub fn build_set_tree(root: impl AsRef<Path>, options: &ScanOptions) -> SetTree {
    let root = root.as_ref();
    debug!(?root, cascade_override = options.cascade_override, "build_set_tree: called");
    let mut tree = SetTree::new();

    if !root.is_dir() {
        debug!(?root, "build_set_tree: root does not exist, returning empty tree");
        return tree;
    }

    let top = scan_direct(root, options);
    if !top.is_empty() {
        debug!(count = top.len(), "build_set_tree: registering top-level Root bucket");
        let mut buckets = SetBuckets::new();
        buckets.insert(ROOT_BUCKET.to_string(), bucket(ROOT_BUCKET, ROOT_BUCKET, top));
        tree.sets.insert(ROOT_BUCKET.to_string(), buckets);
    }

    for (set_name, set_dir) in child_dirs(root) {
        let buckets = build_set(&set_name, &set_dir, options);
        if buckets.is_empty() {
            debug!(%set_name, "build_set_tree: set has no prompts, skipping");
            continue;
        }
        tree.sets.insert(set_name, buckets);
    }

    info!(?root, sets = tree.len(), "Built prompt set tree");
    tree
}

fn build_set(set_name: &str, set_dir: &Path, options: &ScanOptions) -> SetBuckets {
    debug!(%set_name, "build_set: called");
    let mut buckets = SetBuckets::new();
    let set_root = scan_direct(set_dir, options);

    for (sub_name, sub_dir) in child_dirs(set_dir) {
        let own = scan_direct(&sub_dir, options);
        let merged = inherit(&set_root, own, options.cascade_override);
        if merged.is_empty() {
            debug!(%set_name, %sub_name, "build_set: sub-set has no prompts, skipping");
            continue;
        }
        buckets.insert(sub_name.clone(), bucket(set_name, &sub_name, merged));
    }

    if !set_root.is_empty() {
        buckets.insert(ROOT_BUCKET.to_string(), bucket(set_name, ROOT_BUCKET, set_root));
    }

    buckets
}

/// Copy the parent's prompts into a sub-set
fn inherit(parent: &PromptCollection, mut child: PromptCollection, cascade_override: bool) -> PromptCollection {
    for (name, entry) in parent.iter() {
        if cascade_override {
            if child.insert_if_absent(name, entry.clone()) {
                debug!(%name, "inherit: filled gap from parent");
            }
        } else if child.insert(name, entry.clone()).is_some() {
            debug!(%name, "inherit: parent overrides sub-set prompt");
        }
    }
    child
}

fn bucket(set_name: &str, bucket_name: &str, prompts: PromptCollection) -> PromptSet {
    PromptSet::new(format!("{}/{}", set_name, bucket_name), prompts)
}

/// Immediate, non-hidden, non-reserved subdirectories in name order
fn child_dirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut dirs = Vec::new();

    for result in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(?dir, error = %e, "Failed to read prompt set folder entry");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            debug!(%name, "child_dirs: skipping hidden folder");
            continue;
        }
        if name.eq_ignore_ascii_case(ROOT_BUCKET) {
            warn!(path = ?entry.path(), "Skipping folder named after the reserved Root bucket");
            continue;
        }

        dirs.push((name, entry.into_path()));
    }

    dirs
}
