//! Target descriptors and the `Podlink.toml` manifest they are read from.
//!
//! A descriptor names one integration unit: the generated libraries to link,
//! the base configuration file, the resource-copy script, and the native
//! targets of the consumer project that receive them.
//!
//! ```toml
//! [[integration]]
//! name = "Pods"
//! user_project = "App.project.json"
//! sandbox_project = "Pods/Pods.project.json"
//! xcconfig = "Pods/Pods.xcconfig"
//! copy_resources_script = "${SRCROOT}/Pods/Pods-resources.sh"
//! user_targets = ["0A1B2C3D4E5F60718293A4B5"]
//!
//! [[integration.library]]
//! name = "AFNetworking"
//! product_name = "libPods-AFNetworking.a"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use thiserror::Error;

use crate::core::project::ObjectId;
use crate::ops::errors::IntegrateError;
use crate::util::diagnostic::ManifestParseError;
use crate::util::fs;

/// File name of the descriptor manifest.
pub const MANIFEST_NAME: &str = "Podlink.toml";

/// Errors locating the descriptor manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `{}` in `{}` or any parent directory", MANIFEST_NAME, .dir.display())]
    NotFound { dir: PathBuf },
}

/// A generated library to link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// Display name (e.g. the pod name)
    pub name: String,
    /// File name of the built product in the sandbox products group
    pub product_name: String,
}

impl Library {
    /// A library whose product is `lib<name>.a`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Library {
            product_name: static_library_name(&name),
            name,
        }
    }
}

/// One integration unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Logical target name; also the name of the sandbox native target
    pub name: String,
    pub libraries: Vec<Library>,
    pub user_project_path: PathBuf,
    pub sandbox_project_path: PathBuf,
    /// Base configuration file on disk
    pub xcconfig_path: PathBuf,
    /// Script path as it should appear in the generated phase; may contain
    /// build variables such as `${SRCROOT}`
    pub copy_resources_script_path: String,
    /// Native targets of the consumer project to integrate into
    pub user_target_ids: Vec<ObjectId>,
}

impl TargetDescriptor {
    /// File name of the static library built for this target.
    pub fn product_name(&self) -> String {
        static_library_name(&self.name)
    }

    /// Base configuration path relative to the consumer project's directory.
    pub fn xcconfig_relative_path(&self) -> PathBuf {
        let root = self.user_project_path.parent().unwrap_or(Path::new("."));
        fs::relative_path(root, &self.xcconfig_path)
    }
}

fn static_library_name(name: &str) -> String {
    format!("lib{}.a", name)
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    integration: Vec<IntegrationTable>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IntegrationTable {
    name: String,
    #[serde(default, rename = "library")]
    libraries: Vec<LibraryTable>,
    user_project: PathBuf,
    sandbox_project: PathBuf,
    xcconfig: PathBuf,
    copy_resources_script: String,
    user_targets: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LibraryTable {
    name: String,
    product_name: Option<String>,
}

/// Parse a descriptor manifest; relative paths resolve against `base_dir`.
pub fn parse_descriptors(
    source: &str,
    manifest_name: &str,
    base_dir: &Path,
) -> Result<Vec<TargetDescriptor>> {
    let manifest: ManifestFile = toml::from_str(source)
        .map_err(|e| ManifestParseError::from_toml(manifest_name, source.to_string(), &e))?;

    let mut descriptors = Vec::with_capacity(manifest.integration.len());
    for table in manifest.integration {
        let descriptor = table.into_descriptor(base_dir);
        validate(&descriptor, &descriptors)?;
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}

/// Load every descriptor from the manifest at `path`.
pub fn load_descriptors(path: &Path) -> Result<Vec<TargetDescriptor>> {
    let source = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    parse_descriptors(&source, &path.display().to_string(), base_dir)
}

/// Find the manifest in `start` or the nearest parent directory.
pub fn find_manifest(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ManifestError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}

impl IntegrationTable {
    fn into_descriptor(self, base_dir: &Path) -> TargetDescriptor {
        TargetDescriptor {
            libraries: self
                .libraries
                .into_iter()
                .map(|lib| match lib.product_name {
                    Some(product_name) => Library {
                        name: lib.name,
                        product_name,
                    },
                    None => Library::new(lib.name),
                })
                .collect(),
            user_project_path: base_dir.join(self.user_project),
            sandbox_project_path: base_dir.join(self.sandbox_project),
            xcconfig_path: base_dir.join(self.xcconfig),
            copy_resources_script_path: self.copy_resources_script,
            user_target_ids: self.user_targets.into_iter().map(ObjectId::new).collect(),
            name: self.name,
        }
    }
}

fn validate(descriptor: &TargetDescriptor, previous: &[TargetDescriptor]) -> Result<()> {
    let invalid = |reason: &str| IntegrateError::DescriptorInvalid {
        name: descriptor.name.clone(),
        reason: reason.to_string(),
    };

    if descriptor.name.trim().is_empty() {
        return Err(invalid("`name` must not be empty").into());
    }
    if descriptor.user_target_ids.is_empty() {
        return Err(invalid("`user_targets` must list at least one target id").into());
    }
    if previous.iter().any(|d| d.name == descriptor.name) {
        return Err(invalid("the name is used by an earlier integration").into());
    }
    Ok(())
}
