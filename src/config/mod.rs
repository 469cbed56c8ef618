//! Configuration management for ndims-extract
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. the embedded `default-config.toml`
//! 2. `ndims-extract.toml` / `.json` / `.yaml` / `.yml` in the working directory
//! 3. the file given with `--config`
//! 4. `NDIMS_EXTRACT_*` environment variables (`__` separates nested keys)
//! 5. command-line overrides

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::filter::Selector;
use crate::parallel::ExecutionMode;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Base name of the per-project config file
pub const PROJECT_CONFIG_NAME: &str = "ndims-extract";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "NDIMS_EXTRACT_";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Macro identifier compared against 2 and 3
    pub selector: String,

    /// Directories searched recursively for sources
    pub roots: Vec<PathBuf>,

    /// File-name glob patterns selecting the sources
    pub include: Vec<String>,

    /// Honour .gitignore/.ignore files and skip hidden entries while walking
    #[serde(default)]
    pub use_gitignore: bool,

    #[serde(default)]
    pub follow_symlinks: bool,

    #[serde(default)]
    pub parallel: ParallelConfig,
}

/// Worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Maximum number of worker threads (0 = auto-detect)
    #[serde(default)]
    pub max_threads: usize,

    /// Percentage of CPU cores to use (1-100)
    #[serde(default = "default_thread_percentage")]
    pub thread_percentage: u8,

    /// File count from which `auto` mode goes parallel
    #[serde(default = "default_min_files_for_parallel")]
    pub min_files_for_parallel: usize,
}

fn default_thread_percentage() -> u8 {
    75
}

fn default_min_files_for_parallel() -> usize {
    64
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Auto,
            max_threads: 0,
            thread_percentage: default_thread_percentage(),
            min_files_for_parallel: default_min_files_for_parallel(),
        }
    }
}

/// Values supplied on the command line; unset fields leave lower layers alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<PathBuf>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
}

impl ExtractConfig {
    /// Load, merge and validate configuration
    pub fn load(custom_config: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(path) = custom_config
            && !path.is_file()
        {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: ExtractConfig = Self::figment(custom_config, overrides)
            .extract()
            .context("Failed to load configuration")?;

        tracing::debug!(selector = %config.selector, roots = ?config.roots, "configuration loaded");

        config.validate()?;
        Ok(config)
    }

    /// The provider chain behind [`ExtractConfig::load`]
    pub fn figment(custom_config: Option<&Path>, overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::file(format!("{PROJECT_CONFIG_NAME}.toml")))
            .merge(Json::file(format!("{PROJECT_CONFIG_NAME}.json")))
            .merge(Yaml::file(format!("{PROJECT_CONFIG_NAME}.yaml")))
            .merge(Yaml::file(format!("{PROJECT_CONFIG_NAME}.yml")));

        if let Some(path) = custom_config {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        // Environment and CLI always win
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !is_c_identifier(&self.selector) {
            anyhow::bail!("Selector `{}` is not a valid C identifier", self.selector);
        }

        if self.roots.is_empty() {
            anyhow::bail!("At least one root directory must be specified");
        }

        if self.include.is_empty() {
            anyhow::bail!("At least one include pattern must be specified");
        }

        if !(1..=100).contains(&self.parallel.thread_percentage) {
            anyhow::bail!(
                "parallel.thread_percentage must be between 1 and 100, got {}",
                self.parallel.thread_percentage
            );
        }

        Ok(())
    }

    pub fn selector(&self) -> Selector {
        Selector::new(self.selector.clone())
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests;
