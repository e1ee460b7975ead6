//! Configuration management for orcrview.
//!
//! Settings come from an optional TOML file in the data directory,
//! overridden by `ORCRVIEW_*` environment variables. The data directory
//! itself defaults to the platform data dir and can be moved with
//! `--data-dir` or `ORCRVIEW_DATA_DIR`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the optional config file inside the data directory.
const CONFIG_FILE: &str = "config.toml";

/// Runtime settings for the server and CLI.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Production nodes treat the filesystem as read-only and never
    /// persist cache files locally.
    pub production: bool,
    pub host: String,
    pub port: u16,
}

/// On-disk config file shape; every field optional.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    production: Option<bool>,
    host: Option<String>,
    port: Option<u16>,
}

impl Settings {
    /// Load settings for a data directory, applying file and env overrides.
    pub fn load(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir
            .or_else(|| std::env::var_os("ORCRVIEW_DATA_DIR").map(PathBuf::from))
            .or_else(|| dirs::data_dir().map(|d| d.join("orcrview")))
            .unwrap_or_else(|| PathBuf::from(".orcrview"));

        let file = Self::read_config_file(&data_dir.join(CONFIG_FILE))?;

        let production = match std::env::var("ORCRVIEW_ENV") {
            Ok(v) => v.eq_ignore_ascii_case("production"),
            Err(_) => file.production.unwrap_or(false),
        };
        let host = std::env::var("ORCRVIEW_HOST")
            .ok()
            .or(file.host)
            .unwrap_or_else(|| "127.0.0.1".to_string());
        let port = std::env::var("ORCRVIEW_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .or(file.port)
            .unwrap_or(3000);

        Ok(Self {
            data_dir,
            production,
            host,
            port,
        })
    }

    fn read_config_file(path: &Path) -> anyhow::Result<ConfigFile> {
        if !path.exists() {
            return Ok(ConfigFile::default());
        }
        let raw = fs::read_to_string(path)?;
        let parsed = toml::from_str(&raw)?;
        debug!("Loaded config from {}", path.display());
        Ok(parsed)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("orcrview.db")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("result-cache")
    }

    /// Create the data and cache directories if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.cache_dir())
    }
}
