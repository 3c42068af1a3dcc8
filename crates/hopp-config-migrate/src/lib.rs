//! Migration utilities for hopp tab session files
//!
//! Older builds wrote the tab list as a bare JSON array in the working
//! directory, addressing each tab by `tabId` while the request inside kept an
//! unrelated `id`. Tabs are now addressed by `id` alone.
//!
//! # Migrations
//!
//! - `.rest-tabs.json` → `~/.config/hopp/tabs.json`

use anyhow::{Context, Result};
use hopp_config::{global_tabs_path, TabsFile};
use hopp_data::RestRequest;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

const LEGACY_TABS_FILE: &str = ".rest-tabs.json";

/// Run all migrations
///
/// This should be called during application bootstrap.
/// Migrations are idempotent - they only run if needed.
pub fn run_migrations() {
    let result = global_tabs_path()
        .and_then(|new_path| migrate_tabs(Path::new(LEGACY_TABS_FILE), &new_path));
    if let Err(e) = result {
        log::warn!("Tab migration failed: {:#}", e);
    }
}

/// Rewrite a legacy tab list at `old_path` into `new_path`
///
/// Returns whether a file was written. The legacy file is removed afterwards,
/// also when `new_path` already existed.
fn migrate_tabs(old_path: &Path, new_path: &Path) -> Result<bool> {
    if !old_path.exists() {
        log::debug!("No legacy tabs file to migrate");
        return Ok(false);
    }

    if new_path.exists() {
        log::debug!("Tabs file already exists, skipping migration");
        remove_legacy(old_path);
        return Ok(false);
    }

    let content = fs::read_to_string(old_path)
        .with_context(|| format!("Failed to read legacy tabs file: {:?}", old_path))?;
    let file = convert_legacy(&content, &RestRequest::default())?;

    log::info!(
        "Migrating {} tab(s) from {:?} to {:?}",
        file.tabs.len(),
        old_path,
        new_path
    );
    file.save_to_path(new_path)
        .context("Failed to save migrated tabs")?;

    remove_legacy(old_path);
    log::info!("Tab migration completed successfully");
    Ok(true)
}

fn remove_legacy(old_path: &Path) {
    if let Err(e) = fs::remove_file(old_path) {
        log::warn!("Failed to remove legacy tabs file: {}", e);
    } else {
        log::info!("Removed legacy tabs file after migration");
    }
}

/// Move `tabId` into `id` and wrap the list into the current file shape
fn convert_legacy(content: &str, default: &RestRequest) -> Result<TabsFile> {
    let value: Value = serde_json::from_str(content).context("Failed to parse legacy tabs JSON")?;
    let Value::Array(entries) = value else {
        anyhow::bail!("Legacy tabs file is not a list");
    };

    let tabs: Vec<Value> = entries
        .into_iter()
        .map(|mut entry| {
            if let Some(obj) = entry.as_object_mut() {
                if let Some(tab_id) = obj.remove("tabId") {
                    obj.insert("id".to_string(), tab_id);
                }
            }
            entry
        })
        .collect();

    TabsFile::from_json(&json!({ "tabs": tabs }).to_string(), default)
}
