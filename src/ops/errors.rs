//! Integration error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::project::ObjectId;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A reference the integration needs cannot be resolved, or a descriptor is
/// unusable.
#[derive(Debug, Error)]
pub enum IntegrateError {
    #[error("no native target with id `{id}` in `{}`", .project.display())]
    TargetNotFound { id: ObjectId, project: PathBuf },

    #[error("no native target named `{name}` in sandbox project `{}`", .project.display())]
    SandboxTargetNotFound { name: String, project: PathBuf },

    #[error("product `{product}` of library `{library}` not found in group `{group}` of `{}`", .project.display())]
    ProductNotFound {
        library: String,
        product: String,
        group: String,
        project: PathBuf,
    },

    #[error("invalid integration `{name}`: {reason}")]
    DescriptorInvalid { name: String, reason: String },
}

impl IntegrateError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            IntegrateError::TargetNotFound { project, .. } => Diagnostic::error(self.to_string())
                .with_location(project)
                .with_suggestion(suggestions::TARGET_NOT_FOUND),

            IntegrateError::SandboxTargetNotFound { project, .. } => {
                Diagnostic::error(self.to_string())
                    .with_location(project)
                    .with_suggestion(suggestions::SANDBOX_TARGET_NOT_FOUND)
            }

            IntegrateError::ProductNotFound { project, group, .. } => {
                Diagnostic::error(self.to_string())
                    .with_location(project)
                    .with_context(format!("looked up by path in the `{}` group", group))
                    .with_suggestion(suggestions::PRODUCT_NOT_FOUND)
            }

            IntegrateError::DescriptorInvalid { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::NO_MANIFEST)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_not_found_diagnostic() {
        let err = IntegrateError::ProductNotFound {
            library: "JSONKit".into(),
            product: "libPods-JSONKit.a".into(),
            group: "Products".into(),
            project: PathBuf::from("Pods/Pods.project.json"),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: product `libPods-JSONKit.a` of library `JSONKit`"));
        assert!(output.contains("--> Pods/Pods.project.json"));
        assert!(output.contains("`Products` group"));
    }

    #[test]
    fn test_target_not_found_message() {
        let err = IntegrateError::TargetNotFound {
            id: ObjectId::from("ABC"),
            project: PathBuf::from("App.project.json"),
        };
        assert_eq!(
            err.to_string(),
            "no native target with id `ABC` in `App.project.json`"
        );
    }
}
