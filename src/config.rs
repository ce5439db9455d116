use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::console::masking::NOT_CONFIGURED;

// ── Top-level config ──────────────────────────────────────────────

/// Console settings (`~/.gatecfg/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Secret classification and masking (`[secrets]`).
    #[serde(default)]
    pub secrets: SecretsConfig,
    /// Log output (`[logging]`).
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ── Secrets ───────────────────────────────────────────────────────

fn default_unset_label() -> String {
    NOT_CONFIGURED.into()
}

/// Secret classification configuration (`[secrets]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Extra key suffixes treated as secret on top of the built-in list,
    /// e.g. `["pin_code"]`.
    #[serde(default)]
    pub extra_suffixes: Vec<String>,
    /// Text shown in place of a secret with no value.
    #[serde(default = "default_unset_label")]
    pub unset_label: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            extra_suffixes: Vec::new(),
            unset_label: default_unset_label(),
        }
    }
}

// ── Logging ───────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".into()
}

/// Logging configuration (`[logging]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown names fall back to `info`.
    pub fn max_level(&self) -> tracing::Level {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" | "warning" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }
}

/// Default config location: `~/.gatecfg/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|u| u.home_dir().join(".gatecfg").join("config.toml"))
}

impl ConsoleConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse console config")
    }

    /// Load config from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Load from `path` if given, else from the default location.
    ///
    /// A missing default file is not an error and yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        match default_config_path() {
            Some(p) if p.exists() => Self::load_from(&p),
            Some(p) => {
                tracing::debug!("No console config at {}, using defaults", p.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}
