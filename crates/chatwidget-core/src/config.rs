use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::backend::DEFAULT_ENDPOINT;
use crate::state::DEFAULT_GREETING;

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "CHATWIDGET_ENDPOINT";

pub const DEFAULT_TITLE: &str = "Chat with the Resume";
pub const DEFAULT_SUBTITLE: &str = "Ask questions about the experience";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Pick the endpoint: explicit override, then environment, then file, then default.
    pub fn resolve_endpoint(&self, cli_override: Option<&str>) -> String {
        let from_env = std::env::var(ENDPOINT_ENV).ok();
        Self::pick_endpoint(cli_override, from_env.as_deref(), self.endpoint.as_deref())
    }

    fn pick_endpoint(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
        [cli, env, file]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn subtitle(&self) -> &str {
        self.subtitle.as_deref().unwrap_or(DEFAULT_SUBTITLE)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("chatwidget").join("config.json"))
    }
}
