//! Application configuration loading.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Directory under the user's config root holding the toolkit config.
pub const CONFIG_DIR: &str = "assetkit";
/// Name of the configuration file.
pub const CONFIG_FILE: &str = "config.toml";

/// Runtime configuration for the acquisition layer.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory used when a download has no explicit destination.
    pub scratch_dir: PathBuf,
    /// Timeout applied to each transfer request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration, layering the optional config file and
    /// `ASSETKIT_*` environment variables over built-in defaults.
    pub fn load() -> Result<Self> {
        let defaults = AppConfig::default();
        let scratch_dir = defaults.scratch_dir.to_string_lossy().to_string();

        Config::builder()
            .set_default("scratch_dir", scratch_dir)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .add_source(File::from(config_file_path()).required(false))
            .add_source(Environment::with_prefix("ASSETKIT"))
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("failed to parse configuration")
    }
}

/// Path of the user-level configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Default directory for downloads without an explicit destination.
pub fn default_scratch_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_DIR)
}

/// Write a default config file on first run, leaving any existing file
/// untouched.
pub fn ensure_default_config() -> Result<()> {
    let path = config_file_path();
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let defaults = AppConfig::default();
    let contents = format!(
        "# assetkit configuration\nscratch_dir = '{}'\nrequest_timeout_secs = {}\n",
        defaults.scratch_dir.display(),
        defaults.request_timeout_secs
    );
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}
