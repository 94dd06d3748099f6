use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration loaded from ~/.config/bookshelfctl/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub migrate: MigrateConfig,
}

/// Where collections are persisted
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// SQLite database file (default: ~/.local/share/bookshelfctl/bookshelf.db)
    pub path: Option<PathBuf>,
}

/// HTTP client settings shared by every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Provider selection and per-provider options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Fail when more than one provider claims a URL instead of taking the first
    #[serde(default)]
    pub reject_ambiguous: bool,

    /// Translation language requested from MangaDex
    #[serde(default = "default_language")]
    pub mangadex_language: String,
}

/// Settings for the timestamp-to-chapter migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Pause before each provider request in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Extra attempts for a fetch that failed with a transient error
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("bookshelfctl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_language() -> String {
    "en".to_string()
}

fn default_delay_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    2
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            reject_ambiguous: false,
            mangadex_language: default_language(),
        }
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl Config {
    /// Load configuration from the default path (~/.config/bookshelfctl/config.toml)
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("bookshelfctl").join("config.toml"))
    }

    /// Get the store path, with CLI override taking precedence
    pub fn store_path(&self, cli_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(path) = cli_override.cloned().or_else(|| self.store.path.clone()) {
            return Ok(path);
        }
        let data_dir = dirs::data_dir().context("Could not determine data directory")?;
        Ok(data_dir.join("bookshelfctl").join("bookshelf.db"))
    }

    /// Get the migration delay, with CLI override taking precedence
    pub fn migrate_delay_ms(&self, cli_override: Option<u64>) -> u64 {
        cli_override.unwrap_or(self.migrate.delay_ms)
    }
}
