use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::search::DEFAULT_SNIPPET_RADIUS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_snippet_radius")]
    pub snippet_radius: usize,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_snippet_radius() -> usize {
    DEFAULT_SNIPPET_RADIUS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snippet_radius: default_snippet_radius(),
            max_file_size: None,
            log_level: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".kwsearch"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn effective_snippet_radius(&self) -> usize {
        std::env::var("KWSEARCH_SNIPPET_RADIUS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.snippet_radius)
    }

    pub fn effective_max_file_size(&self) -> Option<u64> {
        self.max_file_size_with(std::env::var("KWSEARCH_MAX_FILE_SIZE").ok().as_deref())
    }

    /// Apply an override value; `0` means unlimited, as with `config --max-file-size 0`.
    fn max_file_size_with(&self, raw: Option<&str>) -> Option<u64> {
        match raw.and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => self.max_file_size,
        }
    }
}
