use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

/// Tool configuration: where the database lives and the default
/// identity the CLI dispatcher acts as. A chat-gateway dispatcher
/// carries identity per event instead; the CLI reads it from here
/// unless overridden on the command line.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_workspace")]
    pub workspace: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

fn default_workspace() -> String {
    "default".to_string()
}

fn default_user() -> String {
    whoami()
}

fn default_display_name() -> String {
    whoami()
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            workspace: default_workspace(),
            user: default_user(),
            display_name: default_display_name(),
        }
    }
}

impl Config {
    /// Standard configuration directory for the current platform.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskbot")
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("taskbot.sqlite")
    }

    /// Load the config file, falling back to defaults when it does not
    /// exist or cannot be parsed.
    pub fn load() -> Self {
        let path = Self::config_file();
        match fs::read_to_string(&path) {
            Ok(raw) => serde_yaml::from_str(&raw).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;
        let raw = serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("cannot serialize config: {}", e)))?;
        fs::write(Self::config_file(), raw)?;
        Ok(())
    }
}
