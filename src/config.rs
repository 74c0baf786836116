use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "gm-statblocks";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub import: ImportConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

/// Import validation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Files larger than this are rejected before parsing.
    pub max_file_bytes: usize,
    /// Extensions read as Tetra Cube monster files.
    pub monster_extensions: Vec<String>,
    /// Extensions read as canonical statblock JSON.
    pub statblock_extensions: Vec<String>,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Also write JSON logs to a daily file under the data directory.
    pub file_logging: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 5 * 1024 * 1024,
            monster_extensions: vec!["monster".to_string()],
            statblock_extensions: vec!["json".to_string(), "txt".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file_logging: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/gm-statblocks/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data
            .data_dir
            .clone()
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .map(|d| d.join(APP_DIR))
                    .unwrap_or_else(|| PathBuf::from("data"))
            })
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
