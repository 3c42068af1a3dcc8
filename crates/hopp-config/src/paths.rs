//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/hopp/`, `~/.cache/hopp/`
//! - macOS: `~/Library/Application Support/hopp/`, `~/Library/Caches/hopp/`
//! - Windows: `%APPDATA%\hopp\`, `%LOCALAPPDATA%\hopp\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "hopp";
const TABS_FILE: &str = "tabs.json";
const LOCAL_TABS_FILE: &str = ".hopp.tabs.json";

pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
    Ok(dir)
}

/// Log files of release builds go here
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory: {:?}", dir))?;
    Ok(dir)
}

pub fn global_tabs_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(TABS_FILE))
}

/// Per-project tab session in the working directory
pub fn local_tabs_path() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(LOCAL_TABS_FILE))
}

pub fn has_local_tabs() -> bool {
    local_tabs_path().map(|p| p.exists()).unwrap_or(false)
}
