//! Fluent facade over the engine
//!
//! ```ignore
//! let ctx = PromptContext::builder(settings).source(Source::SetFolder).load();
//! let text = ctx.select("CustomerService/Refund")?.combine();
//! ```
//!
//! Loading performs all file I/O once; selections and composition are pure.

use std::borrow::Cow;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::ROOT_BUCKET;
use crate::collection::{PromptCollection, PromptSet};
use crate::compose::{ComposeOptions, Composer};
use crate::config::Settings;
use crate::entry::PromptEntry;
use crate::error::PromptError;
use crate::format::split_file_name;
use crate::path::{PathScope, PromptPath};
use crate::scanner::{load_prompt, scan_prompts};
use crate::tree::{SetTree, build_set_tree};

/// Where prompts come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Source {
    /// One prompt file; every selection resolves to it
    File(PathBuf),
    /// The flat prompts folder, scanned recursively
    PromptsFolder,
    /// The prompt set tree
    #[default]
    SetFolder,
}

/// Builder for [`PromptContext`]
#[derive(Debug, Clone)]
pub struct PromptContextBuilder {
    settings: Settings,
    source: Source,
}

impl PromptContextBuilder {
    pub fn source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Read the configured source from disk
    pub fn load(self) -> PromptContext {
        PromptContext::load(self.settings, self.source)
    }
}

/// Loaded prompts for one source
#[derive(Debug, Clone)]
enum Loaded {
    File(Option<(String, PromptEntry)>),
    Prompts(PromptSet),
    Sets(SetTree),
}

/// A loaded prompt source that paths can be selected from
#[derive(Debug, Clone)]
pub struct PromptContext {
    settings: Settings,
    loaded: Loaded,
}

impl PromptContext {
    pub fn builder(settings: Settings) -> PromptContextBuilder {
        PromptContextBuilder {
            settings,
            source: Source::default(),
        }
    }

    /// Load a source using the given settings
    pub fn load(settings: Settings, source: Source) -> Self {
        debug!(?source, "PromptContext::load: called");
        let options = settings.scan_options();

        let loaded = match source {
            Source::File(path) => {
                let entry = load_prompt(&path, &settings.extensions).map(|entry| {
                    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
                    let name = split_file_name(&file_name, &settings.extensions)
                        .map(|(stem, _)| stem)
                        .unwrap_or(file_name);
                    (name, entry)
                });
                info!(?path, found = entry.is_some(), "Loaded prompt file");
                Loaded::File(entry)
            }
            Source::PromptsFolder => {
                let prompts = scan_prompts(&settings.prompts_folder, &options);
                Loaded::Prompts(PromptSet::new("Prompts", prompts))
            }
            Source::SetFolder => Loaded::Sets(build_set_tree(&settings.prompt_set_folder, &options)),
        };

        Self { settings, loaded }
    }

    /// The loaded set tree, when the source is the set folder
    pub fn tree(&self) -> Option<&SetTree> {
        match &self.loaded {
            Loaded::Sets(tree) => Some(tree),
            _ => None,
        }
    }

    /// The loaded flat prompts, when the source is the prompts folder
    pub fn prompts(&self) -> Option<&PromptSet> {
        match &self.loaded {
            Loaded::Prompts(set) => Some(set),
            _ => None,
        }
    }

    /// Resolve a selection path against the loaded source
    pub fn select(&self, path: &str) -> Result<Selection<'_>, PromptError> {
        debug!(%path, "PromptContext::select: called");
        let target = match &self.loaded {
            Loaded::File(entry) => self.select_file(entry.as_ref(), path)?,
            Loaded::Prompts(set) => self.select_prompt(set, PromptPath::parse(path, PathScope::Prompts)?)?,
            Loaded::Sets(tree) => self.select_set(tree, PromptPath::parse(path, PathScope::Sets)?)?,
        };

        Ok(Selection {
            target,
            composer: self.settings.composer(),
            options: self.settings.compose_options(),
        })
    }

    fn select_file<'a>(&self, entry: Option<&'a (String, PromptEntry)>, path: &str) -> Result<Target<'a>, PromptError> {
        match entry {
            Some((name, entry)) => Ok(Target::Prompt { name: name.clone(), entry }),
            None => Err(PromptError::PromptNotFound { name: path.to_string() }),
        }
    }

    fn select_prompt<'a>(&self, set: &'a PromptSet, path: PromptPath) -> Result<Target<'a>, PromptError> {
        match path {
            PromptPath::AllPrompts => Ok(Target::Set {
                set: Cow::Borrowed(set),
                fallback: None,
            }),
            PromptPath::SinglePrompt(name) => single(set, None, name),
            other => Err(PromptError::InvalidPath {
                path: other.to_string(),
                reason: "not a prompt folder path".to_string(),
            }),
        }
    }

    fn select_set<'a>(&self, tree: &'a SetTree, path: PromptPath) -> Result<Target<'a>, PromptError> {
        match path {
            PromptPath::SetRoot(set) => {
                let fallback = if set.eq_ignore_ascii_case(ROOT_BUCKET) { None } else { tree.root() };
                let own = match bucket(tree, &set, ROOT_BUCKET) {
                    Ok(own) => Cow::Borrowed(own),
                    // A set with only sub-set folders has no Root bucket of its own
                    Err(PromptError::SubsetNotFound { .. }) => {
                        debug!(%set, "PromptContext::select: set has no root files, composing fallback only");
                        Cow::Owned(PromptSet::new(format!("{}/{}", set, ROOT_BUCKET), PromptCollection::new()))
                    }
                    Err(e) => return Err(e),
                };
                Ok(Target::Set { set: own, fallback })
            }
            PromptPath::SetSubset(set, sub) => {
                let own = bucket(tree, &set, &sub)?;
                Ok(Target::Set {
                    set: Cow::Borrowed(own),
                    fallback: parent_of(tree, &set, &sub),
                })
            }
            PromptPath::SetSubsetPrompt(set, sub, prompt) => {
                let own = bucket(tree, &set, &sub)?;
                single(own, parent_of(tree, &set, &sub), prompt)
            }
            other => Err(PromptError::InvalidPath {
                path: other.to_string(),
                reason: "not a prompt set path".to_string(),
            }),
        }
    }
}

fn bucket<'a>(tree: &'a SetTree, set: &str, sub: &str) -> Result<&'a PromptSet, PromptError> {
    let buckets = tree.get_set(set).ok_or_else(|| PromptError::SetNotFound { name: set.to_string() })?;
    buckets
        .get(sub)
        .or_else(|| buckets.iter().find(|(k, _)| k.eq_ignore_ascii_case(sub)).map(|(_, v)| v))
        .ok_or_else(|| PromptError::SubsetNotFound {
            set: set.to_string(),
            subset: sub.to_string(),
        })
}

/// The set's Root bucket, unless `sub` is that bucket
fn parent_of<'a>(tree: &'a SetTree, set: &str, sub: &str) -> Option<&'a PromptSet> {
    if sub.eq_ignore_ascii_case(ROOT_BUCKET) {
        None
    } else {
        tree.get(set, ROOT_BUCKET)
    }
}

fn single<'a>(set: &'a PromptSet, fallback: Option<&'a PromptSet>, name: String) -> Result<Target<'a>, PromptError> {
    let entry = set
        .get(&name)
        .or_else(|| fallback.and_then(|f| f.get(&name)))
        .ok_or_else(|| PromptError::PromptNotFound { name: name.clone() })?;
    Ok(Target::Prompt { name, entry })
}

/// What a selection resolved to
#[derive(Debug, Clone)]
enum Target<'a> {
    Set {
        set: Cow<'a, PromptSet>,
        fallback: Option<&'a PromptSet>,
    },
    Prompt {
        name: String,
        entry: &'a PromptEntry,
    },
}

/// A resolved selection, ready to combine
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    target: Target<'a>,
    composer: Composer,
    options: ComposeOptions,
}

impl<'a> Selection<'a> {
    /// Override the composition options taken from the settings
    pub fn with_options(mut self, options: ComposeOptions) -> Self {
        self.options = options;
        self
    }

    /// The selected prompt, when the path named a single prompt
    pub fn entry(&self) -> Option<(&str, &'a PromptEntry)> {
        match &self.target {
            Target::Prompt { name, entry } => Some((name.as_str(), *entry)),
            Target::Set { .. } => None,
        }
    }

    /// The selected set and its fallback, when the path named a set
    pub fn set(&self) -> Option<(&PromptSet, Option<&'a PromptSet>)> {
        match &self.target {
            Target::Set { set, fallback } => Some((set.as_ref(), *fallback)),
            Target::Prompt { .. } => None,
        }
    }

    /// Compose the selection into text
    pub fn combine(&self) -> String {
        match &self.target {
            Target::Set { set, fallback } => self.composer.combine(set, *fallback, &self.options),
            Target::Prompt { entry, .. } => entry.text().trim_end().to_string(),
        }
    }
}

impl std::fmt::Display for Selection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.combine())
    }
}
