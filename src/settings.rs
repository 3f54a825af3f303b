//! Locating and reading the user's settings.

use crate::args::Options;
use anyhow::{Context, Result};
use cellwise_core::Settings;
use directories::ProjectDirs;
use std::path::PathBuf;

/// `<config dir>/cellwise/config.toml`, e.g. `~/.config/cellwise/config.toml` on Linux.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cellwise").map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn load(options: &Options) -> Result<Settings> {
    if let Some(path) = &options.config {
        return Settings::load(path)
            .with_context(|| format!("failed to read config {}", path.display()));
    }
    if options.no_config {
        return Ok(Settings::default());
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            log::debug!("using config {}", path.display());
            Settings::load(&path)
                .with_context(|| format!("failed to read config {}", path.display()))
        }
        _ => Ok(Settings::default()),
    }
}
