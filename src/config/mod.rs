//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the binary on top of these)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::{FormatTag, MAX_DEPTH};
use crate::error::{Result, SqzError};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Operation history configuration
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SqzError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)?;
        Ok(config.normalized())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Default config file location (`<config dir>/sqtext/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sqtext").join("config.toml"))
    }

    /// Load `path` (or the default file if it exists), then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `SQTEXT_*` environment variables on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(format) = std::env::var("SQTEXT_FORMAT") {
            match format.parse() {
                Ok(format) => self.engine.default_format = format,
                Err(e) => tracing::warn!("Ignoring SQTEXT_FORMAT: {e}"),
            }
        }
        if let Ok(val) = std::env::var("SQTEXT_DEPTH") {
            if let Ok(val) = val.parse() {
                self.engine.default_depth = val;
            }
        }
        if let Ok(val) = std::env::var("SQTEXT_MAX_DEPTH") {
            if let Ok(val) = val.parse() {
                self.engine.max_depth = val;
            }
        }
        if let Ok(val) = std::env::var("SQTEXT_GZIP_LEVEL") {
            if let Ok(val) = val.parse() {
                self.engine.gzip_level = val;
            }
        }

        self.normalized()
    }

    /// Clamp out-of-range values
    pub fn normalized(mut self) -> Self {
        self.engine = self.engine.normalized();
        self
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Format used when the caller does not name one
    pub default_format: FormatTag,

    /// Recursion depth used when the caller does not name one
    pub default_depth: u32,

    /// Upper bound for recursion depth (at most 10)
    pub max_depth: u32,

    /// Gzip level (0-9)
    pub gzip_level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_format: FormatTag::UltraCompactV2,
            default_depth: 1,
            max_depth: MAX_DEPTH,
            gzip_level: 6,
        }
    }
}

impl EngineConfig {
    /// Clamp depths to `1..=10` and the level to `0..=9`
    pub fn normalized(mut self) -> Self {
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            tracing::warn!("max_depth {} out of range, clamping", self.max_depth);
            self.max_depth = self.max_depth.clamp(1, MAX_DEPTH);
        }
        if self.default_depth == 0 || self.default_depth > self.max_depth {
            tracing::warn!("default_depth {} out of range, clamping", self.default_depth);
            self.default_depth = self.default_depth.clamp(1, self.max_depth);
        }
        if self.gzip_level > 9 {
            tracing::warn!("gzip_level {} out of range, clamping", self.gzip_level);
            self.gzip_level = 9;
        }
        self
    }
}

/// Operation history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Record operations
    pub enabled: bool,

    /// Entries kept (newest first)
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 100,
        }
    }
}
