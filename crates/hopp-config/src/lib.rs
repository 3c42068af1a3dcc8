//! Configuration and file management for hopp
//!
//! This crate provides:
//! - File path utilities for config and cache files
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig)
//! - Tab session persistence (TabsFile)

pub mod app_config;
pub mod config_file;
pub mod paths;
pub mod tabs_file;

pub use app_config::AppConfig;
pub use config_file::load_config_file;
pub use paths::{cache_dir, config_dir, global_tabs_path, has_local_tabs, local_tabs_path};
pub use tabs_file::{TabsFile, TabsMeta, TABS_VERSION};
