use crate::client::{DEFAULT_API_VERSION, DEFAULT_HOST};
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_KEYS: &[&str] = &["api_version", "host", "format"];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pub")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// A missing file is an empty config; a file that does not parse is an error.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            CliError::Config(format!("{} is not a valid config file: {e}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "api_version" | "api-version" => self.api_version = Some(value),
            "host" => self.host = Some(value),
            "format" => self.format = Some(value),
            _ => {
                return Err(CliError::InvalidInput(format!(
                    "Unknown config key: {key}. Valid keys: {}",
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Resolve with priority: CLI flags > env vars > config file > defaults.
    ///
    /// clap already folds `PUB_*` variables into the flags; they are looked up
    /// again here so callers that bypass clap get the same answer.
    pub fn resolve(
        &self,
        path: PathBuf,
        flag_api_version: Option<&str>,
        flag_host: Option<&str>,
        flag_format: Option<&str>,
    ) -> ResolvedConfig {
        let pick = |flag: Option<&str>, env: &str, file: &Option<String>, default: &str| {
            flag.map(str::to_string)
                .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
                .or_else(|| file.clone())
                .unwrap_or_else(|| default.to_string())
        };

        ResolvedConfig {
            api_version: pick(flag_api_version, "PUB_API_VERSION", &self.api_version, DEFAULT_API_VERSION),
            host: pick(flag_host, "PUB_HOST", &self.host, DEFAULT_HOST),
            format: pick(flag_format, "PUB_FORMAT", &self.format, "json"),
            path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_version: String,
    pub host: String,
    pub format: String,
    pub path: PathBuf,
}
