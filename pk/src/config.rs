//! PromptKit configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::compose::{ComposeOptions, Composer, CompositionOrder};
use crate::scanner::ScanOptions;

/// Main PromptKit configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Prompt resolution settings
    pub prompts: Settings,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::default_paths(),
        };

        paths
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|config| config.log_level)
    }

    /// Project-local `.promptkit.yml`, then `~/.config/promptkit/promptkit.yml`
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".promptkit.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("promptkit").join("promptkit.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).context(format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}

/// Prompt resolution settings, threaded explicitly through every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root for the flat prompt scan
    #[serde(rename = "prompts-folder")]
    pub prompts_folder: PathBuf,

    /// Root for the prompt set tree
    #[serde(rename = "prompt-set-folder")]
    pub prompt_set_folder: PathBuf,

    /// Recognized file extensions
    pub extensions: Vec<String>,

    /// Composition priority order of prompt names
    #[serde(rename = "prompt-order")]
    pub prompt_order: Vec<String>,

    /// Only scan prompts named in `prompt_order`
    #[serde(rename = "constrain-to-list")]
    pub constrain_to_list: bool,

    /// Separator between composed prompts; may contain `{name}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    /// Child folders override parent prompts with the same name
    #[serde(rename = "cascade-override")]
    pub cascade_override: bool,

    /// Composition order mode
    pub order: CompositionOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompts_folder: PathBuf::from("Prompts"),
            prompt_set_folder: PathBuf::from("PromptSets"),
            extensions: crate::DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            prompt_order: Vec::new(),
            constrain_to_list: false,
            separator: None,
            cascade_override: true,
            order: CompositionOrder::default(),
        }
    }
}

impl Settings {
    /// Scan options derived from these settings
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            extensions: self.extensions.clone(),
            cascade_override: self.cascade_override,
            allowed_names: self.constrain_to_list.then(|| self.prompt_order.clone()),
        }
    }

    /// Composition options derived from these settings
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            order: self.order,
            ordered_keys: self.prompt_order.clone(),
            separator: None,
        }
    }

    /// Composer using the configured separator template
    pub fn composer(&self) -> Composer {
        Composer::new(self.separator.clone())
    }

    /// Resolve relative folders against a base directory
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.prompts_folder.is_relative() {
            self.prompts_folder = base.join(&self.prompts_folder);
        }
        if self.prompt_set_folder.is_relative() {
            self.prompt_set_folder = base.join(&self.prompt_set_folder);
        }
        self
    }
}
