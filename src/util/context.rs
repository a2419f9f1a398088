//! Global context for podlink operations.
//!
//! Provides centralized access to the working directory, the podlink home
//! directory and the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::descriptor::{find_manifest, ManifestError};
use crate::util::config::{global_config_dir, load_config, Config};

/// Name of the project-local configuration directory.
pub const PROJECT_CONFIG_DIR: &str = ".podlink";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global podlink data (~/.podlink/)
    home: PathBuf,
}

impl GlobalContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext rooted at a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_DIR));
        GlobalContext { cwd, home }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Project configuration file path, next to the manifest when one is
    /// given and in the working directory otherwise.
    pub fn project_config_path(&self, manifest: Option<&Path>) -> PathBuf {
        let root = manifest
            .and_then(Path::parent)
            .unwrap_or(self.cwd.as_path());
        root.join(PROJECT_CONFIG_DIR).join("config.toml")
    }

    /// Global configuration overlaid with the project configuration.
    pub fn load_config(&self, manifest: Option<&Path>) -> Config {
        load_config(&self.config_path(), &self.project_config_path(manifest))
    }

    /// Find the manifest starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        find_manifest(&self.cwd)
    }

    /// Resolve a manifest path given on the command line against cwd, or
    /// search for one when none was given.
    pub fn manifest_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(self.cwd.join(path)),
            None => Ok(self.find_manifest()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::MANIFEST_NAME;
    use tempfile::TempDir;

    #[test]
    fn test_find_manifest_searches_upward() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&manifest, "").unwrap();
        let nested = tmp.path().join("App").join("Sources");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested);
        assert_eq!(ctx.find_manifest().unwrap(), manifest);
    }

    #[test]
    fn test_manifest_path_explicit() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(
            ctx.manifest_path(Some(Path::new("other/Podlink.toml"))).unwrap(),
            tmp.path().join("other/Podlink.toml")
        );
    }

    #[test]
    fn test_project_config_sits_next_to_manifest() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("project");
        std::fs::create_dir_all(project.join(PROJECT_CONFIG_DIR)).unwrap();
        std::fs::write(
            project.join(PROJECT_CONFIG_DIR).join("config.toml"),
            "[integrate]\nframeworks_group = \"Libraries\"\n",
        )
        .unwrap();
        let manifest = project.join(MANIFEST_NAME);

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(
            ctx.project_config_path(Some(&manifest)),
            project.join(PROJECT_CONFIG_DIR).join("config.toml")
        );
        assert_eq!(
            ctx.project_config_path(None),
            tmp.path().join(PROJECT_CONFIG_DIR).join("config.toml")
        );

        let config = ctx.load_config(Some(&manifest)).integrate_config();
        assert_eq!(config.frameworks_group, "Libraries");
    }
}
