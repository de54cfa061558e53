// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "DIRECTORY_CONFIG_PATH";
pub const ENV_DATA_DIR: &str = "DIRECTORY_DATA_DIR";
pub const ENV_PAGE_SIZE: &str = "DIRECTORY_PAGE_SIZE";

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Where the CSV sources live and how the directory pages them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// File names under `data_dir`, highest priority first.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_sources() -> Vec<String> {
    ["list1.csv", "list2.csv", "list3.csv", "list4.csv"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sources: default_sources(),
            page_size: default_page_size(),
        }
    }
}

impl DirectoryConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading directory config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $DIRECTORY_CONFIG_PATH
    /// 2) config/directory.toml
    /// 3) config/directory.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = Self::load_file_default()?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn load_file_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/directory.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/directory.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            let dir = dir.trim();
            if !dir.is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Some(n) = std::env::var(ENV_PAGE_SIZE)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            self.page_size = n;
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<DirectoryConfig> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || !s.trim_start().starts_with('{');
    if try_toml {
        if let Ok(v) = toml::from_str::<DirectoryConfig>(s) {
            return clean(v);
        }
    }
    if let Ok(v) = serde_json::from_str::<DirectoryConfig>(s) {
        return clean(v);
    }
    if !try_toml {
        if let Ok(v) = toml::from_str::<DirectoryConfig>(s) {
            return clean(v);
        }
    }
    Err(anyhow!("unsupported directory config format"))
}

/// Trim source names, drop blanks and repeats (first position wins, since
/// order is priority).
fn clean(mut cfg: DirectoryConfig) -> Result<DirectoryConfig> {
    if cfg.page_size == 0 {
        return Err(anyhow!("page_size must be greater than zero"));
    }
    let mut out: Vec<String> = Vec::with_capacity(cfg.sources.len());
    for s in cfg.sources {
        let t = s.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    cfg.sources = out;
    Ok(cfg)
}
