//! Configuration management for aspfmt.
//!
//! This module provides the [`Config`] struct which controls all formatting behavior.
//! Configuration can be loaded from:
//! - TOML files (`aspfmt.toml`)
//! - CLI arguments (which override file settings)
//! - In-file directives (`' aspfmt: --indent 2`)
//!
//! Config files are auto-discovered by searching parent directories from the file
//! being formatted up to the filesystem root, plus the user's home directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::directive::DirectiveOverrides;
use crate::format::NormalizeOptions;
use crate::limits::SafetyLimits;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["aspfmt.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_indent() -> usize {
    4
}
fn default_true() -> bool {
    true
}
fn default_cache_ttl_secs() -> u64 {
    30
}

/// Main configuration struct for aspfmt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per indent level (default: 4)
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Re-indent script lines (default: true)
    #[serde(default = "default_true")]
    pub impose_indent: bool,

    /// Rewrite keywords and object members to canonical case (default: true)
    #[serde(default = "default_true")]
    pub impose_case: bool,

    /// Normalize spacing around operators (default: true)
    #[serde(default = "default_true")]
    pub impose_whitespace: bool,

    /// Insert a blank line above procedure declarations (default: true)
    #[serde(default = "default_true")]
    pub blank_lines: bool,

    /// External canonical case table replacing the bundled one
    #[serde(default)]
    pub spec_table: Option<PathBuf>,

    /// Lifetime of cached document analyses in seconds (default: 30)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Safety ceilings for every structural walk
    #[serde(default)]
    pub limits: SafetyLimits,
}

/// Partial safety limits for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialLimits {
    pub max_loop_iterations: Option<usize>,
    pub max_lines: Option<usize>,
    pub max_token_length: Option<usize>,
    pub max_text_length: Option<usize>,
    pub max_nesting_depth: Option<usize>,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub indent: Option<usize>,
    pub impose_indent: Option<bool>,
    pub impose_case: Option<bool>,
    pub impose_whitespace: Option<bool>,
    pub blank_lines: Option<bool>,
    pub spec_table: Option<PathBuf>,
    pub cache_ttl_secs: Option<u64>,
    #[serde(default)]
    pub limits: PartialLimits,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent: 4,
            impose_indent: true,
            impose_case: true,
            impose_whitespace: true,
            blank_lines: true,
            spec_table: None,
            cache_ttl_secs: 30,
            limits: SafetyLimits::default(),
        }
    }
}

impl Config {
    /// Maximum reasonable indent size
    const MAX_INDENT: usize = 16;
    /// Lowest accepted value for any safety ceiling
    const MIN_LIMIT: usize = 1;

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.indent == 0 {
            return Some("indent must be at least 1".to_string());
        }
        if self.indent > Self::MAX_INDENT {
            return Some(format!(
                "indent {} exceeds maximum of {}",
                self.indent,
                Self::MAX_INDENT
            ));
        }
        let limits = [
            ("max_loop_iterations", self.limits.max_loop_iterations),
            ("max_lines", self.limits.max_lines),
            ("max_token_length", self.limits.max_token_length),
            ("max_text_length", self.limits.max_text_length),
            ("max_nesting_depth", self.limits.max_nesting_depth),
        ];
        for (name, value) in limits {
            if value < Self::MIN_LIMIT {
                return Some(format!("limits.{name} must be at least {}", Self::MIN_LIMIT));
            }
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Merge a TOML file over this configuration
    pub fn merge_toml_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        self.apply_partial(&partial);
        Ok(())
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.indent {
            self.indent = v;
        }
        if let Some(v) = partial.impose_indent {
            self.impose_indent = v;
        }
        if let Some(v) = partial.impose_case {
            self.impose_case = v;
        }
        if let Some(v) = partial.impose_whitespace {
            self.impose_whitespace = v;
        }
        if let Some(v) = partial.blank_lines {
            self.blank_lines = v;
        }
        if let Some(v) = &partial.spec_table {
            self.spec_table = Some(v.clone());
        }
        if let Some(v) = partial.cache_ttl_secs {
            self.cache_ttl_secs = v;
        }

        let limits = &partial.limits;
        if let Some(v) = limits.max_loop_iterations {
            self.limits.max_loop_iterations = v;
        }
        if let Some(v) = limits.max_lines {
            self.limits.max_lines = v;
        }
        if let Some(v) = limits.max_token_length {
            self.limits.max_token_length = v;
        }
        if let Some(v) = limits.max_text_length {
            self.limits.max_text_length = v;
        }
        if let Some(v) = limits.max_nesting_depth {
            self.limits.max_nesting_depth = v;
        }
    }

    /// Apply in-file directive overrides
    ///
    /// An indent outside `1..=16` is ignored.
    pub fn apply_directive(&mut self, overrides: &DirectiveOverrides) {
        if let Some(v) = overrides
            .indent
            .filter(|v| (1..=Self::MAX_INDENT).contains(v))
        {
            self.indent = v;
        }
        if let Some(v) = overrides.impose_indent {
            self.impose_indent = v;
        }
        if let Some(v) = overrides.impose_case {
            self.impose_case = v;
        }
        if let Some(v) = overrides.impose_whitespace {
            self.impose_whitespace = v;
        }
        if let Some(v) = overrides.blank_lines {
            self.blank_lines = v;
        }
    }

    /// Which per-line rewrites the case normalizer applies
    #[must_use]
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            impose_case: self.impose_case,
            impose_whitespace: self.impose_whitespace,
        }
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the file's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root first, so deeper directories override
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let config_files = Self::discover_config_files(start_path);

        let mut config = Self::default();
        for path in &config_files {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
            }
        }
        config
    }
}
