//! # Host Configuration
//!
//! Optional TOML settings for the command-line host.
//!
//! ```toml
//! [crawl]
//! max_visited = 100000
//! max_depth = 64
//!
//! [log]
//! format = "text"
//! ```
//!
//! Precedence, lowest first: defaults, the TOML file, `HAWTHORN_LOG_FORMAT`,
//! command-line flags.

use hawthorn_core::{CrawlLimits, HawthornError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File read when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG_PATH: &str = "hawthorn.toml";

/// Environment variable selecting the log formatter.
pub const LOG_FORMAT_ENV: &str = "HAWTHORN_LOG_FORMAT";

// =============================================================================
// CONFIG TYPES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default bounds for every `query` crawl step.
    pub crawl: CrawlLimits,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub format: LogFormat,
}

/// Log line formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse `text` or `json`, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Load from an explicit path, or from `hawthorn.toml` when it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, HawthornError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HawthornError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HawthornError::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| {
            HawthornError::ConfigError(format!(
                "Failed to parse TOML in '{}': {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, HawthornError> {
        toml::from_str(toml)
            .map_err(|e| HawthornError::ConfigError(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply `HAWTHORN_LOG_FORMAT` on top of the file settings.
    ///
    /// Unrecognized values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(format) = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|raw| LogFormat::parse(&raw))
        {
            self.log.format = format;
        }
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
