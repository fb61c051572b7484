//! Host-level settings file (`~/.selfup/config.toml`).
//!
//! The update pipeline itself reads no configuration; the CLI loads this
//! file, applies command-line overrides and hands explicit values to each
//! call.
//!
//! ```toml
//! [update]
//! repository = "acme/tool"
//! asset_prefix = "tool"
//! api_url = "https://github.example.com/api/v3"
//! timeout_secs = 60
//! download_timeout_secs = 1200
//! token = "ghp_xxxxxxxxxxxx"
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_API_URL, DEFAULT_ASSET_PREFIX, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_REPOSITORY,
};
use crate::core::UpdateError;
use crate::upgrade::{ReleaseFeed, UpdateTarget};

/// Contents of the global config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// `[update]` table
    pub update: UpdateSettings,
}

/// `[update]` table: where to look for releases and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSettings {
    /// Release feed as `owner/repo`
    pub repository: String,
    /// Product part of asset names
    pub asset_prefix: String,
    /// GitHub API root
    pub api_url: String,
    /// Release feed request timeout in seconds
    pub timeout_secs: u64,
    /// Asset download timeout in seconds
    pub download_timeout_secs: u64,
    /// Bearer token for the API, e.g. to lift rate limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl UpdateSettings {
    /// Feed and asset prefix for one pipeline run.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::InvalidFeed`] if `repository` is not
    /// `owner/repo`.
    pub fn target(&self) -> Result<UpdateTarget, UpdateError> {
        let feed: ReleaseFeed = self.repository.parse()?;
        Ok(UpdateTarget::new(feed, self.asset_prefix.clone()))
    }

    /// Request timeout. Zero is treated as one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Asset download timeout. Zero is treated as one second.
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs.max(1))
    }
}

impl GlobalConfig {
    /// Load from the location chosen by [`resolve_path`](Self::resolve_path).
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed, or if no home
    /// directory can be determined.
    pub async fn load(explicit: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(explicit)?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML for this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| UpdateError::ConfigError {
            message: format!("{}: {e}", path.display()),
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Which file to read: `explicit` (e.g. `--config`), then
    /// `SELFUP_CONFIG`, then the default path. `~` is expanded in the first
    /// two.
    ///
    /// # Errors
    ///
    /// Fails only when falling back to the default path and no home directory
    /// can be determined.
    pub fn resolve_path(explicit: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = explicit.filter(|p| !p.is_empty()) {
            return Ok(expand(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Ok(expand(&path));
            }
        }
        Self::default_path()
    }

    /// `~/.selfup/config.toml`, or `%LOCALAPPDATA%\selfup\config.toml` on
    /// Windows.
    ///
    /// # Errors
    ///
    /// Fails when the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("selfup")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".selfup")
        };

        Ok(config_dir.join("config.toml"))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
