//! PromptKit - folder-based prompt set resolution and composition
//!
//! Discovers prompt files on disk, organizes them into named prompt sets, and
//! joins a selected subset of prompts into a single string ready to be sent to
//! a chat model.
//!
//! # Layout
//!
//! ```text
//! PromptSets/
//! ├── system.md                 # Root/Root
//! ├── CustomerService/
//! │   ├── system.md             # CustomerService/Root
//! │   ├── Refund/
//! │   │   └── instructions.md   # CustomerService/Refund (+ inherited system)
//! │   └── Policy/
//! │       └── examples.txt      # CustomerService/Policy (+ inherited system)
//! └── Sales/
//!     └── instructions.md       # Sales/Root
//! ```
//!
//! # Example
//!
//! ```ignore
//! use promptkit::{PromptContext, Settings, Source};
//!
//! let settings = Settings::default();
//! let ctx = PromptContext::builder(settings).source(Source::SetFolder).load();
//! let text = ctx.select("CustomerService/Refund")?.combine();
//! ```
//!
//! # Modules
//!
//! - [`format`] - File extension to content format classification
//! - [`entry`] - Immutable prompt text values
//! - [`collection`] - Case-insensitive named prompt collections and sets
//! - [`scanner`] - Directory scanning and single-file loading
//! - [`tree`] - Two-level prompt set tree with inheritance
//! - [`compose`] - Ordered composition of prompt sets into text
//! - [`path`] - Selection paths (`Set/Sub/prompt`)
//! - [`context`] - Fluent facade over the engine
//! - [`definition`] - Structured prompt definitions (YAML/JSON)
//! - [`render`] - Argument validation and Handlebars hand-off
//! - [`config`] - Configuration types and loading

pub mod cli;
pub mod collection;
pub mod compose;
pub mod config;
pub mod context;
pub mod definition;
pub mod entry;
pub mod error;
pub mod format;
pub mod path;
pub mod render;
pub mod scanner;
pub mod tree;

pub use collection::{PromptCollection, PromptSet};
pub use compose::{ComposeOptions, Composer, CompositionOrder, NAME_PLACEHOLDER, capitalize_key};
pub use config::{Config, Settings};
pub use context::{PromptContext, PromptContextBuilder, Selection, Source};
pub use definition::{ArgumentSpec, ModelHints, PromptDefinition};
pub use entry::PromptEntry;
pub use error::PromptError;
pub use format::{PromptFormat, classify, split_file_name};
pub use path::{PathScope, PromptPath};
pub use render::Renderer;
pub use scanner::{ScanOptions, load_prompt, scan_direct, scan_prompts};
pub use tree::{SetBuckets, SetTree, build_set_tree};

/// Reserved bucket name for files sitting directly inside a folder
pub const ROOT_BUCKET: &str = "Root";

/// Extensions recognized when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[".txt", ".prompt", ".yml", ".jinja", ".jinja2", ".prompt.md", ".md"];

/// Library result type
pub type Result<T> = std::result::Result<T, PromptError>;
