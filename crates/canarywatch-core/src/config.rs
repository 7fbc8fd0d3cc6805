//! Monitor configuration: a TOML file naming the monitor, the journal
//! location and window, and the pages with their pattern checks.
//!
//! Everything the run loop consumes is passed in explicitly from here —
//! there is no global config lookup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::journal::DEFAULT_EXPIRE_MINUTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config lists no pages to monitor")]
    NoPages,

    #[error("smtp password env var {0} is not set")]
    MissingPassword(String),
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Name used in the mail subject and sign-off.
    pub monitor_name: String,

    /// Where the suppression journal lives.
    #[serde(default = "default_journal_path")]
    pub journal_path: PathBuf,

    /// Suppression window in minutes.
    #[serde(default = "default_expire_minutes")]
    pub expire_minutes: u64,

    /// Per-request fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Pages to monitor, visited in listed order.
    pub pages: Vec<PageConfig>,

    /// Mail delivery. Absent means alerts are logged only.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

/// One monitored page and its pattern checks.
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    pub url: String,
    #[serde(default)]
    pub checks: Vec<PatternCheck>,
}

/// A structural query plus the text expected inside every match.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternCheck {
    /// CSS selector locating the subtree to inspect.
    pub selector: String,
    /// Text that must appear (case-insensitively) in the flattened subtree.
    pub expect: String,
}

/// SMTP relay settings. The password is read from the environment, never
/// from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    #[serde(default = "default_password_env")]
    pub password_env: String,
    pub from: String,
    pub recipients: Vec<String>,
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("page_problems.json")
}

fn default_expire_minutes() -> u64 {
    DEFAULT_EXPIRE_MINUTES
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_password_env() -> String {
    "CANARYWATCH_SMTP_PASSWORD".to_string()
}

impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Parse a TOML string into a MonitorConfig.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        if config.pages.is_empty() {
            return Err(ConfigError::NoPages);
        }
        Ok(config)
    }
}

impl SmtpConfig {
    /// Resolve the relay password from the configured env var.
    pub fn password(&self) -> Result<String, ConfigError> {
        std::env::var(&self.password_env)
            .map_err(|_| ConfigError::MissingPassword(self.password_env.clone()))
    }
}
