//! Configuration file support for podlink.
//!
//! Two configuration file locations are read:
//! - Global: `~/.podlink/config.toml` - User-wide defaults
//! - Project: `.podlink/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::project::{FRAMEWORKS_GROUP, PRODUCTS_GROUP};
use crate::util::shell::ColorChoice;

/// podlink configuration as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Integration settings
    pub integrate: IntegrateSettings,

    /// Output settings
    pub output: OutputSettings,
}

/// Integration settings; unset fields fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrateSettings {
    /// Consumer-project group that receives the static library reference
    pub frameworks_group: Option<String>,

    /// Sandbox-project group holding the library products
    pub products_group: Option<String>,

    /// Warn about build settings that shadow the base configuration
    pub check_overrides: Option<bool>,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Color mode (auto, always, never)
    pub color: Option<String>,
}

/// Resolved integration settings handed to the integrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrateConfig {
    pub frameworks_group: String,
    pub products_group: String,
    pub check_overrides: bool,
}

impl Default for IntegrateConfig {
    fn default() -> Self {
        IntegrateConfig {
            frameworks_group: FRAMEWORKS_GROUP.to_string(),
            products_group: PRODUCTS_GROUP.to_string(),
            check_overrides: true,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.integrate.frameworks_group.is_some() {
            self.integrate.frameworks_group = other.integrate.frameworks_group;
        }
        if other.integrate.products_group.is_some() {
            self.integrate.products_group = other.integrate.products_group;
        }
        if other.integrate.check_overrides.is_some() {
            self.integrate.check_overrides = other.integrate.check_overrides;
        }

        if other.output.color.is_some() {
            self.output.color = other.output.color;
        }
    }

    /// Resolve the integration settings against the defaults.
    pub fn integrate_config(&self) -> IntegrateConfig {
        let defaults = IntegrateConfig::default();
        IntegrateConfig {
            frameworks_group: self
                .integrate
                .frameworks_group
                .clone()
                .unwrap_or(defaults.frameworks_group),
            products_group: self
                .integrate
                .products_group
                .clone()
                .unwrap_or(defaults.products_group),
            check_overrides: self
                .integrate
                .check_overrides
                .unwrap_or(defaults.check_overrides),
        }
    }

    /// Parse color choice from config string.
    pub fn color(&self) -> Option<ColorChoice> {
        self.output.color.as_ref().and_then(|s| s.parse().ok())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.podlink/config.toml)
/// 2. Global config (~/.podlink/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global podlink config directory (~/.podlink).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".podlink"))
}
