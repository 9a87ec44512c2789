//! Configuration file support for diffview.
//!
//! Settings come from `diffview.toml` in the working directory, layered over
//! an optional user-wide `diffview/config.toml` in the platform config dir.

use anyhow::{Context, Result};
use diffview_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings loaded from a config file. Every field is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Interface the server binds to
    pub addr: Option<String>,
    /// Port the server listens on
    pub port: Option<u16>,
    /// Open the browser once the server is up
    pub open_browser: Option<bool>,
    /// Default tracing filter (e.g. "info", "diffview_core=debug")
    pub log_level: Option<String>,
    /// Log output format
    pub log_format: Option<LogFormat>,
}

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "diffview.toml";

pub const DEFAULT_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6111;
pub const DEFAULT_LOG_LEVEL: &str = "info";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        Self::load_file(&working_dir.join(CONFIG_FILE_NAME))
    }

    /// Load the user-wide config and the project config, project winning.
    pub fn load_layered(working_dir: &Path) -> Result<Self> {
        let global = match Self::global_path() {
            Some(path) => Self::load_file(&path)?.unwrap_or_default(),
            None => Self::default(),
        };
        let project = Self::load(working_dir)?.unwrap_or_default();

        Ok(project.or(global))
    }

    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("diffview").join("config.toml"))
    }

    /// Fill unset fields from `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            addr: self.addr.or(fallback.addr),
            port: self.port.or(fallback.port),
            open_browser: self.open_browser.or(fallback.open_browser),
            log_level: self.log_level.or(fallback.log_level),
            log_format: self.log_format.or(fallback.log_format),
        }
    }
}
