use anyhow::{Context, Result};
use scanlog_browser::DEFAULT_VIEW_LIMIT_BYTES;
use scanlog_reports::{DEFAULT_CACHE_CAPACITY, DEFAULT_EXPORT_PREFIX};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "scanlog-viewer.toml";

pub const ENV_RESULTS_DIR: &str = "SCANLOG_RESULTS_DIR";
pub const ENV_VIEW_LIMIT_BYTES: &str = "SCANLOG_VIEW_LIMIT_BYTES";
pub const ENV_CACHE_CAPACITY: &str = "SCANLOG_CACHE_CAPACITY";
pub const ENV_EXPORT_PREFIX: &str = "SCANLOG_EXPORT_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Root holding `<model>/analise-<id>/` directories
    pub results_dir: PathBuf,
    /// Inline view budget per artifact
    pub view_limit_bytes: usize,
    /// Parsed reports kept in memory
    pub cache_capacity: usize,
    /// File name prefix of exported reports
    pub export_prefix: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("resultado"),
            view_limit_bytes: DEFAULT_VIEW_LIMIT_BYTES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Invalid viewer config")
    }

    /// Explicit `path`, else `scanlog-viewer.toml` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&raw).with_context(|| format!("In {}", path.display()))
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = lookup(ENV_RESULTS_DIR) {
            self.results_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_VIEW_LIMIT_BYTES) {
            self.view_limit_bytes = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_VIEW_LIMIT_BYTES} must be a byte count"))?;
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            self.cache_capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CACHE_CAPACITY} must be a number"))?;
        }
        if let Some(prefix) = lookup(ENV_EXPORT_PREFIX) {
            self.export_prefix = prefix;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            anyhow::bail!("cache_capacity must be > 0");
        }
        if self.export_prefix.contains(['/', '\\']) {
            anyhow::bail!("export_prefix must not contain path separators");
        }
        Ok(())
    }
}
