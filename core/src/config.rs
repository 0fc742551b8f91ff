//! Configuration management (config.toml)
//!
//! Defaults for decoding and output, stored in TOML in the platform-specific
//! config directory. Command-line flags override whatever is loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::replay::{CommandFilter, DEFAULT_TICKS_PER_SECOND, DecodeOptions, IndexingPolicy};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Decoder settings
    #[serde(default)]
    pub decode: DecodeConfig,
    /// What gets printed or retained
    #[serde(default)]
    pub output: OutputConfig,
    /// Game-session parameters
    #[serde(default)]
    pub session: SessionConfig,
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DecodeConfig {
    /// Record indexing policy (default: positional)
    #[serde(default)]
    pub indexing: IndexingPolicy,
}

/// Output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report empty ticks as well (default: false)
    #[serde(default)]
    pub include_empty_cycles: bool,
    /// Commands to print in detail (default: "none")
    #[serde(default = "default_command_filter")]
    pub command_filter: CommandFilter,
    /// Print the session summary (default: true)
    #[serde(default = "default_true")]
    pub summary: bool,
}

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Simulation ticks per second of game time (default: 12, "Fast" speed)
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
}

fn default_true() -> bool {
    true
}
fn default_command_filter() -> CommandFilter {
    CommandFilter::None
}
fn default_ticks_per_second() -> u32 {
    DEFAULT_TICKS_PER_SECOND
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_empty_cycles: false,
            command_filter: default_command_filter(),
            summary: default_true(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: default_ticks_per_second(),
        }
    }
}

impl Config {
    /// Decoder options derived from this configuration
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            include_empty_cycles: self.output.include_empty_cycles,
            command_filter: self.output.command_filter,
            indexing: self.decode.indexing,
        }
    }
}

/// Errors from loading an explicitly requested config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\icreplay\config`
/// On macOS: `~/Library/Application Support/io.icreplay.icreplay`
/// On Linux: `~/.config/icreplay`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "icreplay", "icreplay")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_dir().map(|dir| dir.join("config.toml")) else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    load_from(&path).unwrap_or_else(|e| {
        tracing::warn!("ignoring config: {}", e);
        Config::default()
    })
}

/// Loads the configuration from an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}
