//! Runtime configuration.
//!
//! Settings come from a TOML file, the process environment, or both; the
//! environment wins.
//!
//! ```toml
//! default_backend = "stable"
//! log_partition_stats = true
//! ```

use crate::error::{Error, Result};
use crate::BackendKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable selecting the default backend (`sorted` or `stable`).
pub const BACKEND_ENV: &str = "ARRAY_SET_BACKEND";

/// Environment variable enabling per-call partition statistics in the log.
pub const LOG_STATS_ENV: &str = "ARRAY_SET_LOG_STATS";

/// Settings used to build a [`crate::BackendRegistry`] and [`crate::Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend used for arrays whose own backend is not registered.
    pub default_backend: BackendKind,
    /// Log the number of classes found by every dispatched call.
    pub log_partition_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_backend: BackendKind::default(),
            log_partition_stats: false,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for values that cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use array_set::{BackendKind, Config};
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "ARRAY_SET_BACKEND" => Some("stable".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.default_backend, BackendKind::Stable);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Config::default().with_overrides(lookup)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use array_set::{BackendKind, Config};
    ///
    /// let config = Config::from_toml_str("default_backend = \"stable\"").unwrap();
    /// assert_eq!(config.default_backend, BackendKind::Stable);
    /// assert!(!config.log_partition_stats);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse_toml(content, "<string>")
    }

    /// Serialize to a TOML document accepted by [`Config::from_toml_str`].
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigParse {
            origin: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigParse`] if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            origin: origin.clone(),
            message: e.to_string(),
        })?;
        Self::parse_toml(&content, &origin)
    }

    /// Load a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load a TOML file, then apply overrides from `lookup`.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_from_file(path)?.with_overrides(lookup)
    }

    fn parse_toml(content: &str, origin: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::ConfigParse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        log::debug!("loaded config from {}: {:?}", origin, config);
        Ok(config)
    }

    /// Apply [`BACKEND_ENV`] and [`LOG_STATS_ENV`] from `lookup` on top of `self`.
    fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(BACKEND_ENV) {
            self.default_backend = value.parse().map_err(|_| Error::InvalidConfig {
                key: BACKEND_ENV,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(LOG_STATS_ENV) {
            self.log_partition_stats = match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(Error::InvalidConfig {
                        key: LOG_STATS_ENV,
                        value,
                    })
                }
            };
        }

        log::debug!("effective config: {:?}", self);
        Ok(self)
    }
}
