//! Core data structures for podlink.
//!
//! - Project documents and their object tree
//! - Base configuration (xcconfig) files
//! - Integration descriptors read from the manifest

pub mod descriptor;
pub mod document;
pub mod project;
pub mod xcconfig;

pub use descriptor::{find_manifest, load_descriptors, Library, TargetDescriptor, MANIFEST_NAME};
pub use document::LazyProject;
pub use project::{NativeTarget, ObjectId, Project};
pub use xcconfig::BaseConfiguration;
