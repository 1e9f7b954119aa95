//! Directory scanning and single-file loading
//!
//! Files are processed shallowest-first. On a name collision the cascade flag
//! decides whether the deeper file replaces the shallower one.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::collection::PromptCollection;
use crate::entry::PromptEntry;
use crate::format::{PromptFormat, classify, split_file_name};

/// Options shared by every scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Recognized file extensions (case-insensitive, e.g. `.md`)
    pub extensions: Vec<String>,
    /// Deeper files replace shallower ones with the same name when true
    pub cascade_override: bool,
    /// Only scan prompts with these names when set and non-empty
    pub allowed_names: Option<Vec<String>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: crate::DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            cascade_override: true,
            allowed_names: None,
        }
    }
}

impl ScanOptions {
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cascade_override(mut self, cascade_override: bool) -> Self {
        self.cascade_override = cascade_override;
        self
    }

    pub fn with_allowed_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Check a prompt name against the allow-list
    pub fn allows(&self, name: &str) -> bool {
        match &self.allowed_names {
            Some(names) if !names.is_empty() => names.iter().any(|n| n.eq_ignore_ascii_case(name)),
            _ => true,
        }
    }
}

/// A prompt file found during a walk, before it is read
#[derive(Debug)]
struct Candidate {
    depth: usize,
    path: PathBuf,
    name: String,
    extension: String,
}

/// Scan a folder recursively into a named collection
///
/// A missing folder yields an empty collection.
pub fn scan_prompts(folder: impl AsRef<Path>, options: &ScanOptions) -> PromptCollection {
    let folder = folder.as_ref();
    debug!(?folder, cascade_override = options.cascade_override, "scan_prompts: called");
    let prompts = scan(folder, usize::MAX, options);
    info!(?folder, count = prompts.len(), "Scanned prompts");
    prompts
}

/// Scan only the files sitting directly inside a folder
pub fn scan_direct(folder: impl AsRef<Path>, options: &ScanOptions) -> PromptCollection {
    let folder = folder.as_ref();
    debug!(?folder, "scan_direct: called");
    scan(folder, 1, options)
}

fn scan(folder: &Path, max_depth: usize, options: &ScanOptions) -> PromptCollection {
    let mut prompts = PromptCollection::new();

    if !folder.is_dir() {
        debug!(?folder, "scan: folder does not exist, returning empty collection");
        return prompts;
    }

    let mut candidates = collect_candidates(folder, max_depth, options);
    candidates.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.path.cmp(&b.path)));
    debug!(?folder, candidates = candidates.len(), "scan: collected candidates");

    for candidate in candidates {
        if !options.allows(&candidate.name) {
            debug!(name = %candidate.name, "scan: name not in allow-list, skipping");
            continue;
        }

        let Some(entry) = read_entry(&candidate.path, &candidate.extension) else {
            continue;
        };

        if prompts.contains(&candidate.name) {
            if options.cascade_override {
                debug!(name = %candidate.name, path = ?candidate.path, "scan: deeper file overrides");
                prompts.insert(candidate.name, entry);
            } else {
                debug!(name = %candidate.name, path = ?candidate.path, "scan: keeping shallower file");
            }
        } else {
            prompts.insert(candidate.name, entry);
        }
    }

    prompts
}

fn collect_candidates(folder: &Path, max_depth: usize, options: &ScanOptions) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_hidden_dir(entry));

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(?folder, error = %e, "Failed to walk prompt folder entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        match split_file_name(&file_name, &options.extensions) {
            Some((name, extension)) => candidates.push(Candidate {
                depth: entry.depth(),
                path: entry.path().to_path_buf(),
                name,
                extension,
            }),
            None => debug!(path = ?entry.path(), "collect_candidates: unrecognized extension"),
        }
    }

    candidates
}

/// Dot-folders such as `.git` never hold prompts
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

/// Read a file into an entry, logging and skipping anything unusable
fn read_entry(path: &Path, extension: &str) -> Option<PromptEntry> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(?path, error = %e, "Failed to read prompt file");
            return None;
        }
    };

    let format = classify(extension);
    if format == PromptFormat::StructuredData
        && let Err(e) = serde_yaml::from_str::<serde_yaml::Value>(&text)
    {
        warn!(?path, error = %e, "Skipping malformed structured prompt file");
        return None;
    }

    Some(PromptEntry::new(text, format))
}

/// Load one prompt file
///
/// Returns `None` when the file is missing, is not a regular file, has an
/// unrecognized extension, or cannot be read.
pub fn load_prompt<S: AsRef<str>>(path: impl AsRef<Path>, extensions: &[S]) -> Option<PromptEntry> {
    let path = path.as_ref();
    debug!(?path, "load_prompt: called");

    if !path.is_file() {
        debug!(?path, "load_prompt: not a file");
        return None;
    }

    let file_name = path.file_name()?.to_string_lossy();
    let Some((_, extension)) = split_file_name(&file_name, extensions) else {
        debug!(?path, "load_prompt: unrecognized extension");
        return None;
    };

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(?path, error = %e, "Failed to read prompt file");
            return None;
        }
    };

    Some(PromptEntry::new(text, classify(&extension)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let prompts = scan_prompts("/nonexistent/prompt/folder", &ScanOptions::default());
        assert!(prompts.is_empty());
    }

    #[test]
    fn test_empty_folder_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(scan_prompts(temp.path(), &ScanOptions::default()).is_empty());
    }

    #[test]
    fn test_cascade_override_deeper_wins() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.prompt", "Root");
        write(temp.path(), "sub/a.prompt", "Sub");

        let prompts = scan_prompts(temp.path(), &ScanOptions::default().with_cascade_override(true));
        assert_eq!(prompts.get("a").map(|e| e.text()), Some("Sub"));
    }

    #[test]
    fn test_no_cascade_shallower_wins() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.prompt", "Root");
        write(temp.path(), "sub/a.prompt", "Sub");

        let prompts = scan_prompts(temp.path(), &ScanOptions::default().with_cascade_override(false));
        assert_eq!(prompts.get("a").map(|e| e.text()), Some("Root"));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "system.md", "System");
        write(temp.path(), "nested/examples.txt", "Examples");
        write(temp.path(), "nested/deeper/tone.prompt", "Tone");

        let options = ScanOptions::default();
        let first = scan_prompts(temp.path(), &options);
        let second = scan_prompts(temp.path(), &options);
        assert_eq!(first, second);
        assert_eq!(first.names().collect::<Vec<_>>(), vec!["system", "examples", "tone"]);
    }

    #[test]
    fn test_allowed_names_filter() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "system.prompt", "S");
        write(temp.path(), "instructions.prompt", "I");
        write(temp.path(), "other.prompt", "O");

        let options = ScanOptions::default().with_allowed_names(["System", "instructions"]);
        let prompts = scan_prompts(temp.path(), &options);
        assert_eq!(prompts.len(), 2);
        assert!(!prompts.contains("other"));
    }

    #[test]
    fn test_empty_allow_list_allows_everything() {
        let options = ScanOptions::default().with_allowed_names(Vec::<String>::new());
        assert!(options.allows("anything"));
    }

    #[test]
    fn test_unrecognized_extensions_are_ignored() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "notes.rs", "fn main() {}");
        write(temp.path(), "system.txt", "S");

        let prompts = scan_prompts(temp.path(), &ScanOptions::default());
        assert_eq!(prompts.len(), 1);
        assert!(prompts.contains("system"));
    }

    #[test]
    fn test_same_depth_extension_collision_uses_path_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "system.md", "markdown");
        write(temp.path(), "system.txt", "plain");

        let prompts = scan_prompts(temp.path(), &ScanOptions::default().with_cascade_override(true));
        let entry = prompts.get("system").unwrap();
        assert_eq!(entry.text(), "plain");
        assert_eq!(entry.format(), PromptFormat::Plain);
    }

    #[test]
    fn test_malformed_yaml_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "broken.yml", "name: [unclosed");
        write(temp.path(), "good.yml", "name: good\ntemplate: hi");

        let prompts = scan_prompts(temp.path(), &ScanOptions::default());
        assert!(!prompts.contains("broken"));
        assert_eq!(prompts.get("good").map(|e| e.format()), Some(PromptFormat::StructuredData));
    }

    #[test]
    fn test_scan_direct_ignores_subfolders() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "top.txt", "T");
        write(temp.path(), "sub/nested.txt", "N");

        let prompts = scan_direct(temp.path(), &ScanOptions::default());
        assert!(prompts.contains("top"));
        assert!(!prompts.contains("nested"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_scanned() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "shared/system.md", "Shared");
        write(temp.path(), "Prompts/own.md", "Own");
        std::os::unix::fs::symlink(temp.path().join("shared/system.md"), temp.path().join("Prompts/system.md")).unwrap();

        let prompts = scan_prompts(temp.path().join("Prompts"), &ScanOptions::default());
        assert_eq!(prompts.get("system").map(|e| e.text()), Some("Shared"));
        assert!(prompts.contains("own"));
    }

    #[test]
    fn test_hidden_folders_are_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".git/system.txt", "git internals");
        write(temp.path(), "nested/.cache/tone.txt", "cached");
        write(temp.path(), "system.txt", "System");

        let prompts = scan_prompts(temp.path(), &ScanOptions::default());
        assert_eq!(prompts.get("system").map(|e| e.text()), Some("System"));
        assert!(!prompts.contains("tone"));
    }

    #[test]
    fn test_custom_extensions() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "system.tmpl", "S");
        write(temp.path(), "other.txt", "O");

        let prompts = scan_prompts(temp.path(), &ScanOptions::default().with_extensions([".TMPL"]));
        assert_eq!(prompts.names().collect::<Vec<_>>(), vec!["system"]);
    }

    #[test]
    fn test_load_prompt() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "system.prompt.md", "# System");

        let entry = load_prompt(temp.path().join("system.prompt.md"), crate::DEFAULT_EXTENSIONS).unwrap();
        assert_eq!(entry.text(), "# System");
        assert_eq!(entry.format(), PromptFormat::Markdown);
    }

    #[test]
    fn test_load_prompt_missing_or_unsupported() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "script.sh", "echo hi");

        assert!(load_prompt(temp.path().join("missing.txt"), crate::DEFAULT_EXTENSIONS).is_none());
        assert!(load_prompt(temp.path().join("script.sh"), crate::DEFAULT_EXTENSIONS).is_none());
        assert!(load_prompt(temp.path(), crate::DEFAULT_EXTENSIONS).is_none());
    }
}
