use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{EngramError, Result};

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";

/// Optional on-disk configuration, loaded from `~/.engram/config.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub redis_url: Option<String>,
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| EngramError::Config(format!("{}: {}", path.display(), e)))
    }

    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".engram").join("config.yaml"))
    }

    /// Resolve the store endpoint. Precedence: explicit flag, then the
    /// `REDIS_URL` environment variable, then the config file, then the
    /// default local address.
    pub fn redis_url(&self, flag: Option<&str>) -> String {
        if let Some(url) = flag {
            return url.to_string();
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            if !url.is_empty() {
                return url;
            }
        }
        self.redis_url
            .clone()
            .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string())
    }
}
