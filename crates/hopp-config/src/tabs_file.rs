//! Tab session persistence
//!
//! # Precedence
//!
//! 1. `$CWD/.hopp.tabs.json` - Local tab session (highest priority)
//! 2. `~/.config/hopp/tabs.json` - Global tab session (fallback)
//!
//! On save: Use local file if it exists, otherwise use global.
//!
//! Loading never fails on bad entries: each tab is decoded field by field and
//! broken fields fall back to the default request.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use hopp_data::{next_free_tab_id, safely_extract_tab, RestRequest, Tab};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::paths;

pub const TABS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabsMeta {
    pub last_modified: DateTime<Utc>,
    pub version: u32,
}

impl Default for TabsMeta {
    fn default() -> Self {
        Self {
            last_modified: Utc::now(),
            version: TABS_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TabsFile {
    pub meta: TabsMeta,
    pub tabs: Vec<Tab>,
}

impl TabsFile {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self {
            meta: TabsMeta::default(),
            tabs,
        }
    }

    /// Load with precedence: local > global > empty
    pub fn load(default: &RestRequest) -> Self {
        if paths::has_local_tabs() {
            if let Ok(path) = paths::local_tabs_path() {
                match Self::load_from_path(&path, default) {
                    Ok(file) => {
                        log::info!("Loaded local tabs from {:?}", path);
                        return file;
                    }
                    Err(e) => log::warn!("Ignoring local tabs file: {:#}", e),
                }
            }
        }

        if let Ok(path) = paths::global_tabs_path() {
            if path.exists() {
                match Self::load_from_path(&path, default) {
                    Ok(file) => {
                        log::info!("Loaded global tabs from {:?}", path);
                        return file;
                    }
                    Err(e) => log::warn!("Ignoring global tabs file: {:#}", e),
                }
            }
        }

        log::info!("No saved tabs found, starting empty");
        Self::default()
    }

    pub fn load_from_path(path: &Path, default: &RestRequest) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tabs file: {:?}", path))?;
        Self::from_json(&content, default)
            .with_context(|| format!("Failed to parse tabs file: {:?}", path))
    }

    /// Decode file content; only text that is not JSON at all is an error
    pub fn from_json(content: &str, default: &RestRequest) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("Tabs file is not JSON")?;

        let meta = value
            .get("meta")
            .cloned()
            .and_then(|meta| serde_json::from_value(meta).ok())
            .unwrap_or_else(|| {
                log::warn!("Tabs file has no readable meta, using defaults");
                TabsMeta::default()
            });

        let entries = match value.get("tabs") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => {
                log::warn!("Tabs file has no tab list");
                &[]
            }
        };
        let tabs = entries
            .iter()
            .map(|entry| safely_extract_tab(entry, default))
            .collect();

        Ok(Self {
            meta,
            tabs: normalize_tabs(tabs),
        })
    }

    /// Save (to local if exists, otherwise global)
    pub fn save(&mut self) -> Result<()> {
        self.meta.last_modified = Utc::now();

        let path = if paths::has_local_tabs() {
            paths::local_tabs_path()?
        } else {
            paths::global_tabs_path()?
        };

        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize tabs")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write tabs file: {:?}", path))?;

        log::info!("Saved {} tab(s) to {:?}", self.tabs.len(), path);
        Ok(())
    }
}

/// Give every tab a unique id and keep at most one active
fn normalize_tabs(tabs: Vec<Tab>) -> Vec<Tab> {
    let mut normalized: Vec<Tab> = Vec::with_capacity(tabs.len());
    let mut seen_active = false;

    for mut tab in tabs {
        if tab.id.is_empty() || normalized.iter().any(|t| t.id == tab.id) {
            let id = next_free_tab_id(&normalized);
            log::warn!("Tab {:?} needs a new id, using {}", tab.id, id);
            tab.id = id;
            tab = tab.with_request(Arc::clone(&tab.request));
        }
        if tab.is_active {
            if seen_active {
                tab.is_active = false;
            }
            seen_active = true;
        }
        normalized.push(tab);
    }
    normalized
}
