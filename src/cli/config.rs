//! Configuration file support.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::deploy::{DEFAULT_API_URL, Session};
use crate::domain::VpsTarget;
use crate::export::InlineLimits;
use crate::infra::LoggingSettings;

/// The `[inline]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InlineSettings {
    pub timeout_secs: u64,
    pub max_resource_bytes: usize,
}

impl Default for InlineSettings {
    fn default() -> Self {
        let limits = InlineLimits::default();
        Self {
            timeout_secs: limits.timeout.as_secs(),
            max_resource_bytes: limits.max_resource_bytes,
        }
    }
}

impl From<InlineSettings> for InlineLimits {
    fn from(settings: InlineSettings) -> Self {
        InlineLimits {
            timeout: Duration::from_secs(settings.timeout_secs),
            max_resource_bytes: settings.max_resource_bytes,
        }
    }
}

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the deploy API
    pub api_url: Option<String>,

    /// Bearer token for the deploy API
    pub token: Option<String>,

    /// Saved target used when `deploy` is given no target flags
    pub default_target: Option<String>,

    pub logging: LoggingSettings,

    pub inline: InlineSettings,

    /// Saved self-hosted deploy targets, by name
    pub targets: BTreeMap<String, VpsTarget>,
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location yields the default config; a
    /// missing file that was named explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let config_path = Self::config_path();
                if !config_path.exists() {
                    return Ok(Self::default());
                }
                Self::load_from(&config_path)
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/pageship/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pageship")
            .join("config.toml")
    }

    /// Resolve the deploy session.
    ///
    /// Precedence order for each value:
    /// 1. CLI argument (or its environment variable)
    /// 2. Config file setting
    /// 3. Built-in default (no token)
    pub fn session(&self, cli_api_url: Option<&str>, cli_token: Option<&str>) -> Result<Session> {
        let api_url = cli_api_url
            .or(self.api_url.as_deref())
            .unwrap_or(DEFAULT_API_URL);
        let token = cli_token.or(self.token.as_deref()).map(str::to_string);

        Session::new(api_url, token).with_context(|| format!("invalid API URL: {api_url}"))
    }

    /// Look up a saved target by name.
    pub fn target(&self, name: &str) -> Result<&VpsTarget> {
        match self.targets.get(name) {
            Some(target) => Ok(target),
            None if self.targets.is_empty() => {
                bail!("unknown target '{name}': no targets are configured")
            }
            None => {
                let known: Vec<&str> = self.targets.keys().map(String::as_str).collect();
                bail!("unknown target '{name}' (known: {})", known.join(", "))
            }
        }
    }
}
