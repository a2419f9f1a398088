//! User-friendly diagnostic messages.
//!
//! Every warning and error shown to the user carries the root cause and,
//! where one exists, a list of remediation actions.

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no descriptor manifest is found.
    pub const NO_MANIFEST: &str =
        "help: Create a Podlink.toml with one [[integration]] table per target";

    /// Suggestion when a user target id cannot be resolved.
    pub const TARGET_NOT_FOUND: &str =
        "help: Check the `user_targets` ids against the project document";

    /// Suggestion when the sandbox project has no target for the descriptor.
    pub const SANDBOX_TARGET_NOT_FOUND: &str =
        "help: Regenerate the sandbox project before integrating";

    /// Suggestion when a library product is missing from the sandbox.
    pub const PRODUCT_NOT_FOUND: &str =
        "help: Check the library `product_name` or regenerate the sandbox project";

    /// First remediation action for an overridden build setting.
    pub const USE_INHERITED: &str = "Use the `$(inherited)` flag, or";

    /// Second remediation action for an overridden build setting.
    pub const REMOVE_OVERRIDE: &str = "Remove the build settings from the target.";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Machine-readable form used by the shell's JSON mode.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "reason": self.severity.to_string(),
            "message": self.message,
            "context": self.context,
            "suggestions": self.suggestions,
            "location": self.location.as_ref().map(|p| p.display().to_string()),
        })
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
                Severity::Help => "\x1b[1;32mhelp\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
                Severity::Help => "help",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Descriptor manifest that is not valid TOML or misses required fields.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("failed to parse `{path}`: {message}")]
#[diagnostic(
    code(podlink::manifest::parse),
    help("Each [[integration]] table needs name, user_project, sandbox_project, xcconfig, copy_resources_script and user_targets")
)]
pub struct ManifestParseError {
    pub path: String,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl ManifestParseError {
    /// Build from a TOML error, keeping the offending span when there is one.
    pub fn from_toml(path: impl Into<String>, source: String, err: &toml::de::Error) -> Self {
        let path = path.into();
        ManifestParseError {
            message: err.message().to_string(),
            span: err.span().map(SourceSpan::from),
            src: NamedSource::new(path.clone(), source),
            path,
        }
    }
}
