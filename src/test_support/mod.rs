//! Test utilities for podlink unit tests.
//!
//! [`IntegrationFixture`] lays out a consumer project, a sandbox project and
//! a base configuration in a temporary directory:
//!
//! ```text
//! <tmp>/App.project.json          target `App` (Debug, Release)
//! <tmp>/Pods/Pods.project.json    target `Pods`, group `Products`
//! <tmp>/Pods/Pods.xcconfig
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::descriptor::{Library, TargetDescriptor, MANIFEST_NAME};
use crate::core::project::{ObjectId, Project, SourceTree, PRODUCTS_GROUP};

pub use fixtures::*;

/// Name of the consumer target in the fixture project.
pub const APP_TARGET: &str = "App";

/// Name of the generated target in the sandbox project.
pub const PODS_TARGET: &str = "Pods";

/// Libraries whose products exist in the fixture sandbox.
pub const LIBRARIES: [&str; 2] = ["Pods-AFNetworking", "Pods-JSONKit"];

/// A consumer/sandbox project pair on disk plus the descriptor tying them.
pub struct IntegrationFixture {
    dir: TempDir,
    pub descriptor: TargetDescriptor,
    pub app_id: ObjectId,
}

impl IntegrationFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let user_path = root.join("App.project.json");
        let mut user = Project::new(&user_path);
        let app_id = user.add_target(APP_TARGET, &["Debug", "Release"]);
        user.save().unwrap();

        let sandbox_path = root.join("Pods").join("Pods.project.json");
        let mut sandbox = Project::new(&sandbox_path);
        sandbox.add_target(PODS_TARGET, &["Debug", "Release"]);
        for name in LIBRARIES {
            let library = Library::new(name);
            sandbox.file_reference_or_create(
                Some(PRODUCTS_GROUP),
                &library.product_name,
                SourceTree::BuiltProducts,
            );
        }
        sandbox.save().unwrap();

        let xcconfig_path = root.join("Pods").join("Pods.xcconfig");
        std::fs::write(&xcconfig_path, BASE_XCCONFIG).unwrap();

        let descriptor = TargetDescriptor {
            name: PODS_TARGET.to_string(),
            libraries: LIBRARIES.iter().map(|name| Library::new(*name)).collect(),
            user_project_path: user_path,
            sandbox_project_path: sandbox_path,
            xcconfig_path,
            copy_resources_script_path: "${SRCROOT}/Pods/Pods-resources.sh".to_string(),
            user_target_ids: vec![app_id.clone()],
        };

        IntegrationFixture {
            dir,
            descriptor,
            app_id,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Load the consumer project, apply `f` and save it again.
    pub fn edit_user_project(&self, f: impl FnOnce(&mut Project)) {
        let mut project = Project::load(&self.descriptor.user_project_path).unwrap();
        f(&mut project);
        project.save().unwrap();
    }

    /// Write the manifest describing this fixture and return its path.
    pub fn write_manifest(&self) -> PathBuf {
        let path = self.root().join(MANIFEST_NAME);
        std::fs::write(&path, manifest_for(&self.descriptor, self.root())).unwrap();
        path
    }
}

impl Default for IntegrationFixture {
    fn default() -> Self {
        Self::new()
    }
}
