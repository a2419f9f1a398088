//! Base configuration files.
//!
//! A base configuration is a generated `KEY = value` settings file that build
//! configurations reference instead of copying. Supported syntax:
//!
//! ```text
//! // comment
//! #include "Shared.xcconfig"
//! OTHER_LDFLAGS = -ObjC -l"Pods-AFNetworking"
//! HEADER_SEARCH_PATHS[sdk=iphoneos*] = "${PODS_ROOT}/Headers";
//! ```
//!
//! Included files are resolved relative to the including file and are read
//! first, so later local definitions win.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;

use crate::util::fs;

static SETTING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(?:\[[^\]]*\])*)\s*=\s*(.*?)\s*;?\s*$")
        .expect("setting pattern is valid")
});

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#include\??\s*"([^"]+)""#).expect("include pattern is valid")
});

/// A parsed base configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseConfiguration {
    path: PathBuf,
    attributes: BTreeMap<String, String>,
}

impl BaseConfiguration {
    /// Load and parse the file at `path`, following includes.
    pub fn load(path: &Path) -> Result<Self> {
        let mut attributes = BTreeMap::new();
        let mut stack = Vec::new();
        load_into(path, &mut attributes, &mut stack)?;
        Ok(BaseConfiguration {
            path: path.to_path_buf(),
            attributes,
        })
    }

    /// Parse `contents` without resolving includes.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Self {
        let mut attributes = BTreeMap::new();
        for line in contents.lines() {
            if let Line::Setting(key, value) = parse_line(line) {
                attributes.insert(key, value);
            }
        }
        BaseConfiguration {
            path: path.into(),
            attributes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

enum Line {
    Setting(String, String),
    Include(String),
    Blank,
}

fn parse_line(raw: &str) -> Line {
    let line = raw.trim();

    if let Some(caps) = INCLUDE_RE.captures(line) {
        return Line::Include(caps[1].to_string());
    }

    let line = strip_comment(line);

    match SETTING_RE.captures(line) {
        Some(caps) => Line::Setting(caps[1].to_string(), caps[2].to_string()),
        None => {
            if !line.is_empty() {
                tracing::debug!("ignoring unrecognized configuration line: {}", line);
            }
            Line::Blank
        }
    }
}

/// Cut a trailing `//` comment. Slashes inside double quotes belong to the
/// value.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut previous_slash = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                previous_slash = false;
            }
            '/' if !in_quotes => {
                if previous_slash {
                    return line[..index - 1].trim_end();
                }
                previous_slash = true;
            }
            _ => previous_slash = false,
        }
    }
    line
}

fn load_into(
    path: &Path,
    attributes: &mut BTreeMap<String, String>,
    stack: &mut Vec<PathBuf>,
) -> Result<()> {
    if stack.iter().any(|p| p == path) {
        bail!("include cycle detected at {}", path.display());
    }
    stack.push(path.to_path_buf());

    let contents = fs::read_to_string(path)?;
    let dir = path.parent().unwrap_or(Path::new("."));

    for line in contents.lines() {
        match parse_line(line) {
            Line::Setting(key, value) => {
                attributes.insert(key, value);
            }
            Line::Include(include) => load_into(&dir.join(include), attributes, stack)?,
            Line::Blank => {}
        }
    }

    stack.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_settings_and_comments() {
        let config = BaseConfiguration::parse(
            "Pods.xcconfig",
            r#"
// Generated file
OTHER_LDFLAGS = -ObjC -l"Pods-AFNetworking"
PODS_ROOT = ${SRCROOT}/Pods   // trailing comment
GCC_PREPROCESSOR_DEFINITIONS = $(inherited) COCOAPODS=1;
HEADER_SEARCH_PATHS[sdk=iphoneos*] = "${PODS_ROOT}/Headers"
not a setting
"#,
        );

        assert_eq!(config.len(), 4);
        assert_eq!(config.get("OTHER_LDFLAGS"), Some(r#"-ObjC -l"Pods-AFNetworking""#));
        assert_eq!(config.get("PODS_ROOT"), Some("${SRCROOT}/Pods"));
        assert_eq!(
            config.get("GCC_PREPROCESSOR_DEFINITIONS"),
            Some("$(inherited) COCOAPODS=1")
        );
        assert!(config.get("HEADER_SEARCH_PATHS[sdk=iphoneos*]").is_some());

        let keys: Vec<_> = config.keys().collect();
        assert_eq!(keys[0], "GCC_PREPROCESSOR_DEFINITIONS");
    }

    #[test]
    fn test_comment_marker_inside_quotes_is_kept() {
        let config = BaseConfiguration::parse(
            "Pods.xcconfig",
            "PODS_URL = \"http://host/pods\" // mirror\nPODS_PATH = a/b//c\n",
        );

        assert_eq!(config.get("PODS_URL"), Some("\"http://host/pods\""));
        assert_eq!(config.get("PODS_PATH"), Some("a/b"));
    }

    #[test]
    fn test_load_follows_includes() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("Shared.xcconfig"),
            "OTHER_LDFLAGS = -lz\nSHARED = yes\n",
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("Pods.xcconfig"),
            "#include \"Shared.xcconfig\"\nOTHER_LDFLAGS = -ObjC\n",
        )
        .unwrap();

        let config = BaseConfiguration::load(&tmp.path().join("Pods.xcconfig")).unwrap();
        assert_eq!(config.get("SHARED"), Some("yes"));
        assert_eq!(config.get("OTHER_LDFLAGS"), Some("-ObjC"));
    }

    #[test]
    fn test_load_detects_include_cycle() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("A.xcconfig"), "#include \"B.xcconfig\"\n").unwrap();
        std::fs::write(tmp.path().join("B.xcconfig"), "#include \"A.xcconfig\"\n").unwrap();

        let err = BaseConfiguration::load(&tmp.path().join("A.xcconfig")).unwrap_err();
        assert!(err.to_string().contains("include cycle"));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(BaseConfiguration::load(&tmp.path().join("missing.xcconfig")).is_err());
    }
}
