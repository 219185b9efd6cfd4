//! Configuration file support for shortarray
//!
//! Loads `.shortarray.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use shortarray_core::Strictness;

pub const CONFIG_FILE: &str = ".shortarray.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Reject token records that are not exactly `[kind, text, line]`
    pub strict: bool,
    /// File name suffix of lexer dumps picked up when walking directories,
    /// e.g. "json" or "php.json"
    pub extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
    /// Extension for written files when the dump name has none left
    pub extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

impl Config {
    /// Load config from `.shortarray.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Strictness for token normalization; `--strict` forces strict mode
    pub fn strictness(&self, cli_strict: bool) -> Strictness {
        if cli_strict || self.input.strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }

    pub fn input_extension(&self) -> &str {
        self.input.extension.as_deref().unwrap_or("json")
    }

    pub fn output_extension(&self) -> &str {
        self.output.extension.as_deref().unwrap_or("php")
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}
