use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::filters::{self, ExtensionFilter};

/// Configuration for one search invocation.
///
/// Can be loaded from YAML config files, in order of precedence:
/// 1. A custom file passed to [`SearchConfig::load_from`] (the CLI's `--config`)
/// 2. Local `.finder.yaml` in the current directory
/// 3. Global `$CONFIG_DIR/finder/config.yaml`
///
/// CLI arguments take precedence over file values via
/// [`SearchConfig::merge_with_cli`]. The configuration is read-only for the
/// duration of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Directory base names pruned from traversal entirely
    #[serde(default = "filters::default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// File-type spec: "source" (default), "all", or a comma-separated
    /// extension list such as "js,ts,py"
    #[serde(default)]
    pub file_types: Option<String>,

    /// Match file names only; the content phase never runs
    #[serde(default)]
    pub name_only: bool,

    /// Match file contents only; collected names are not tested
    #[serde(default)]
    pub content_only: bool,

    /// Case-insensitive matching
    #[serde(default)]
    pub ignore_case: bool,

    /// Cap on concurrently descending directory traversals
    #[serde(default = "default_dir_concurrency")]
    pub max_dir_concurrency: NonZeroUsize,

    /// Cap on concurrently running per-file content scans
    #[serde(default = "default_content_concurrency")]
    pub max_content_concurrency: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_dir_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(10).unwrap()
}

fn default_content_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(20).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: filters::default_exclude_dirs(),
            file_types: None,
            name_only: false,
            content_only: false,
            ignore_case: false,
            max_dir_concurrency: default_dir_concurrency(),
            max_content_concurrency: default_content_concurrency(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally including a specific file.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("finder/config.yaml")),
            // Local config
            Some(PathBuf::from(".finder.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI argument values over configuration file values.
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        if cli_config.exclude_dirs != filters::default_exclude_dirs() {
            self.exclude_dirs = cli_config.exclude_dirs;
        }
        if cli_config.file_types.is_some() {
            self.file_types = cli_config.file_types;
        }
        if cli_config.name_only {
            self.name_only = true;
        }
        if cli_config.content_only {
            self.content_only = true;
        }
        if cli_config.ignore_case {
            self.ignore_case = true;
        }
        if cli_config.max_dir_concurrency != default_dir_concurrency() {
            self.max_dir_concurrency = cli_config.max_dir_concurrency;
        }
        if cli_config.max_content_concurrency != default_content_concurrency() {
            self.max_content_concurrency = cli_config.max_content_concurrency;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Compiles the file-type spec into an extension predicate.
    /// `None` means every extension is accepted.
    pub fn extension_filter(&self) -> Option<ExtensionFilter> {
        ExtensionFilter::from_spec(self.file_types.as_deref().unwrap_or(""))
    }
}
