//! Config resolution for CLI commands

use anyhow::{Context, Result};
use std::path::Path;

use icreplay_core::config::{self, Config};

/// Load `path` if given, otherwise the user's config.toml (or defaults)
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(config::load()),
    }
}
