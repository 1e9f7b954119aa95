//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use crate::compose::CompositionOrder;

/// PromptKit - prompt set resolution and composition
#[derive(Parser)]
#[command(
    name = "pk",
    about = "Resolve prompt sets from folders and compose them into text",
    version,
    after_help = after_help()
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List prompt sets, their buckets and prompt names
    Sets {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List prompts found in the prompts folder
    Scan {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Compose a selection and print it
    Show {
        /// Selection path (Set, Set/Sub, Set/Sub/prompt; or a prompt name with --prompts)
        path: String,

        /// Treat PATH as a single prompt file
        #[arg(long, conflicts_with = "prompts")]
        file: bool,

        /// Select from the flat prompts folder instead of the set tree
        #[arg(short, long)]
        prompts: bool,

        /// Separator between prompts; `{name}` becomes a per-prompt header
        #[arg(short, long)]
        separator: Option<String>,

        /// Composition order (configured, lexical, insertion)
        #[arg(short, long)]
        order: Option<CompositionOrder>,
    },

    /// Render a single prompt with arguments
    Render {
        /// Selection path naming one prompt
        path: String,

        /// Treat PATH as a single prompt file
        #[arg(long, conflicts_with = "prompts")]
        file: bool,

        /// Select from the flat prompts folder instead of the set tree
        #[arg(short, long)]
        prompts: bool,

        /// Template argument as key=value (repeatable)
        #[arg(short = 'a', long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },

    /// Print the effective configuration
    Config,
}

/// Collect `--arg` pairs into a map; later pairs win
pub fn args_to_map(args: &[(String, String)]) -> HashMap<String, String> {
    args.iter().cloned().collect()
}

/// Parse a `key=value` argument
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    debug!(%s, "parse_key_val: called");
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("Invalid argument '{}': expected key=value", s)),
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptkit")
        .join("logs")
        .join("promptkit.log")
}

fn after_help() -> String {
    format!("Logs are written to: {}", get_log_path().display())
}

/// Output format for listing commands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
