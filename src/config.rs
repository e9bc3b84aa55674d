//! Host configuration loaded from TOML.
//!
//! ```toml
//! [scrape]
//! terms = ["location:uganda", "location:kampala"]
//! min_score = 50
//!
//! [server]
//! port = 8787
//!
//! [cache]
//! ttl_seconds = 3600
//! ```
//!
//! Every section and field is optional. The API token is never written
//! back to disk; it comes from the file or from `GITHUB_TOKEN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_search::ScrapeConfig;
use scout_search::config::{MAX_CONCURRENCY, MAX_PAGES, MAX_PER_PAGE, MAX_SCORE};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Defaults for every scrape run.
    pub scrape: ScrapeConfig,
    /// Service listener.
    pub server: ServerConfig,
    /// Run cache sizing.
    pub cache: CacheConfig,
}

/// Listener settings for `scout serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind. `0` picks a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8787,
        }
    }
}

/// Run cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a completed run stays retrievable.
    pub ttl_seconds: u64,
    /// Most runs kept at once.
    pub max_runs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: scout_search::cache::DEFAULT_TTL.as_secs(),
            max_runs: scout_search::cache::DEFAULT_MAX_RUNS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/scout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("scout").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("scout")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/scout-config/config.toml")
        }
    }

    /// Load from `path` if given, else from the default path if it exists,
    /// else defaults. The token fallback from the environment is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded, or
    /// the default file exists but is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config.with_token_fallback(std::env::var(TOKEN_ENV).ok()))
    }

    /// Fill in the API token from `fallback` when none is configured.
    pub fn with_token_fallback(mut self, fallback: Option<String>) -> Self {
        let configured = self
            .scrape
            .token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !configured {
            self.scrape.token = fallback.filter(|t| !t.trim().is_empty());
        }
        self
    }
}

/// Optional per-run knobs layered over the configured defaults.
///
/// Shared by the CLI flags and the service request body. Out-of-range
/// values are clamped, never rejected.
#[derive(Debug, Clone, Default, Deserialize, clap::Args)]
pub struct ScrapeOverrides {
    /// Only match accounts with at least this many public repositories.
    #[arg(long)]
    #[serde(default)]
    pub min_repos: Option<u32>,

    /// Only match accounts with at least this many followers.
    #[arg(long)]
    #[serde(default)]
    pub min_followers: Option<u32>,

    /// Pages fetched per term (1-10).
    #[arg(long)]
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Results per page (1-100).
    #[arg(long)]
    #[serde(default)]
    pub per_page: Option<u32>,

    /// Concurrent detail lookups (1-10).
    #[arg(long)]
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Drop records scoring below this (0-100).
    #[arg(long)]
    #[serde(default)]
    pub min_score: Option<u32>,
}

impl ScrapeOverrides {
    /// Apply to `base`, clamping every value to its allowed range.
    pub fn apply(&self, base: &ScrapeConfig) -> ScrapeConfig {
        let mut config = base.clone();
        if let Some(v) = self.min_repos {
            config.min_repos = v;
        }
        if let Some(v) = self.min_followers {
            config.min_followers = v;
        }
        if let Some(v) = self.max_pages {
            config.max_pages = v.clamp(1, MAX_PAGES);
        }
        if let Some(v) = self.per_page {
            config.per_page = v.clamp(1, MAX_PER_PAGE);
        }
        if let Some(v) = self.concurrency {
            config.concurrency = v.clamp(1, MAX_CONCURRENCY);
        }
        if let Some(v) = self.min_score {
            config.min_score = u8::try_from(v.min(u32::from(MAX_SCORE))).unwrap_or(MAX_SCORE);
        }
        config
    }
}
