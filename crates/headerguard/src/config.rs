//! Configuration management for headerguard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::guard;
use crate::rewriter::WriteMode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name.
const CONFIG_DIR_NAME: &str = "headerguard";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "HEADERGUARD_";

/// Separates table and key in environment variable names
/// (`HEADERGUARD_REWRITE__ALWAYS_WRITE` is `rewrite.always_write`).
const ENV_SEPARATOR: &str = "__";

/// Project tag applied when none is configured.
pub const DEFAULT_TAG: &str = "VEGAFEM";

/// Root directory walked when none is configured.
pub const DEFAULT_ROOT: &str = "libraries";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`HEADERGUARD_<TABLE>__<KEY>`)
/// 2. TOML config file at `~/.config/headerguard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Guard naming configuration.
    pub guard: GuardConfig,
    /// Traversal configuration.
    pub walk: WalkConfig,
    /// Write-back configuration.
    pub rewrite: RewriteConfig,
}

/// Guard naming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Project tag prefixed to guard macro names (`<tag>_NAME`).
    pub tag: String,
}

/// Traversal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Directory walked for headers, relative to the working directory.
    pub root: PathBuf,
}

/// Write-back configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Write every header back, even when its guard is unchanged.
    pub always_write: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self { always_write: true }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if let Err(Error::InvalidTag { tag, reason }) = guard::validate_tag(&self.guard.tag) {
            return Err(Error::ConfigValidation {
                message: format!("guard.tag '{tag}' {reason}"),
            });
        }

        if self.walk.root.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "walk.root must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Render the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The write mode for a rewriting run.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        if self.rewrite.always_write {
            WriteMode::Always
        } else {
            WriteMode::Changed
        }
    }
}
