//! CLI configuration file
//!
//! ```toml
//! schemas = "schemas/pages.yaml"
//!
//! [api]
//! base_url = "https://cms.example.org/api"
//! token = "..."
//! timeout_secs = 30
//!
//! [log]
//! filter = "examdesk_forms=debug,info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use examdesk_api::ApiConfig;
use serde::{Deserialize, Serialize};

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Backend settings
    pub api: ApiConfig,
    /// Schema document replacing the built-in page types
    pub schemas: Option<PathBuf>,
    /// Logging settings
    pub log: LogConfig,
}

impl CliConfig {
    /// Read a TOML config file
    ///
    /// A relative `schemas` path is resolved against the file's directory.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Self =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;

        if let (Some(schemas), Some(dir)) = (config.schemas.as_mut(), path.parent()) {
            if schemas.is_relative() {
                *schemas = dir.join(&*schemas);
            }
        }
        Ok(config)
    }

    /// Read `path` if given, defaults otherwise
    ///
    /// # Errors
    /// Same as [`CliConfig::load`]
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
