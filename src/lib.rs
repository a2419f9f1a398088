//! podlink - integrates generated dependency targets into IDE projects
//!
//! This crate provides the library functionality behind the `podlink`
//! binary: the project document model, base configuration parsing, and the
//! integration steps that wire a generated static library into a consumer
//! project.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for podlink unit tests.
///
/// Only compiled for tests. Lays out throwaway consumer and sandbox
/// projects in temporary directories.
#[cfg(test)]
pub mod test_support;

pub use self::core::{descriptor::TargetDescriptor, project::Project};
pub use ops::{IntegrateError, IntegrationReport};
pub use util::context::GlobalContext;
