use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::ClientSettings;
use crate::logic::breadcrumb::BasePathPolicy;
use crate::logic::formatting::{DEFAULT_DATE_FORMAT, DEFAULT_LOCALE};
use crate::services::aggregator::DEFAULT_MAX_CONCURRENT;
use crate::ui::icons::IconMode;

const APP_DIR: &str = "spbrowse";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Site URL, e.g. https://intranet.example.com/sites/BiblioDoc
    pub base_url: String,
    /// Title of the document library to browse
    pub list_name: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub strict_breadcrumb_base: bool,
    #[serde(default = "default_icon_mode")]
    pub icon_mode: String,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_icon_mode() -> String {
    "emoji".to_string()
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text).context("Invalid config file")?;
        if config.base_url.trim().is_empty() {
            anyhow::bail!("Config field 'base_url' must not be empty");
        }
        if config.list_name.trim().is_empty() {
            anyhow::bail!("Config field 'list_name' must not be empty");
        }
        Ok(config)
    }

    /// Locate and parse the config file
    pub fn load(cli_path: Option<String>) -> Result<(Self, PathBuf)> {
        let path = get_config_path(cli_path)?;
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&text)?;
        Ok((config, path))
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            access_token: self.access_token.clone(),
        }
    }

    pub fn breadcrumb_policy(&self) -> BasePathPolicy {
        if self.strict_breadcrumb_base {
            BasePathPolicy::Strict
        } else {
            BasePathPolicy::Lenient
        }
    }

    pub fn icon_mode(&self) -> IconMode {
        IconMode::from_config(&self.icon_mode)
    }
}

/// Resolve the config file: CLI flag, then the user config dir, then ./config.yaml
pub fn get_config_path(cli_path: Option<String>) -> Result<PathBuf> {
    // If CLI argument provided, use it
    if let Some(path) = cli_path {
        let p = PathBuf::from(&path);
        if p.exists() {
            return Ok(p);
        } else {
            anyhow::bail!("Config file not found at specified path: {}", path);
        }
    }

    // Try ~/.config/spbrowse/config.yaml
    if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(APP_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Ok(config_path);
        }
    }

    // Fallback to ./config.yaml
    let local_config = PathBuf::from(CONFIG_FILE);
    if local_config.exists() {
        return Ok(local_config);
    }

    let expected_path = if let Some(config_dir) = dirs::config_dir() {
        config_dir.join(APP_DIR).join(CONFIG_FILE).display().to_string()
    } else {
        "~/.config/spbrowse/config.yaml".to_string()
    };

    anyhow::bail!(
        "No config file found. Create one at {} or ./config.yaml with at least:\n\n\
         base_url: https://intranet.example.com/sites/BiblioDoc\n\
         list_name: Documentos\n",
        expected_path
    )
}
