//! Configuration: client secrets and CLI defaults

mod secret;

pub use secret::OAuthConfig;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Token-file name used when none is configured.
pub const DEFAULT_TOKEN_FILE: &str = "googleauth.json";

/// Client secret file used when none is configured.
pub const DEFAULT_SECRET_FILE: &str = "client_secret.json";

/// Defaults for the command line, read from `config.toml`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the downloaded client secret JSON
    pub secret_file: Option<PathBuf>,
    /// Logical token-file name under ~/.credentials
    pub token_file: Option<String>,
    /// Space-separated scopes to request
    pub scope: Option<String>,
    /// Try to open the consent page in a browser (default: true)
    pub open_browser: Option<bool>,
}

impl Settings {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "googleauth", "googleauth")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load settings from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Fields set in `other` take precedence.
    pub fn overridden_by(self, other: Settings) -> Settings {
        Settings {
            secret_file: other.secret_file.or(self.secret_file),
            token_file: other.token_file.or(self.token_file),
            scope: other.scope.or(self.scope),
            open_browser: other.open_browser.or(self.open_browser),
        }
    }

    pub fn secret_file(&self) -> PathBuf {
        self.secret_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_FILE))
    }

    pub fn token_file(&self) -> &str {
        self.token_file.as_deref().unwrap_or(DEFAULT_TOKEN_FILE)
    }

    pub fn scope(&self) -> Result<&str> {
        self.scope
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .context("No scope configured. Pass --scope or set it in config.toml.")
    }

    pub fn open_browser(&self) -> bool {
        self.open_browser.unwrap_or(true)
    }
}
