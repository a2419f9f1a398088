//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Whether two paths name the same file, resolving links and `..` when
/// both exist.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Render a path with forward slashes, the form stored in project documents.
pub fn to_document_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/file.txt");

        write_string(&path, "content").unwrap();

        assert_eq!(read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let tmp = TempDir::new().unwrap();
        let err = read_to_string(&tmp.path().join("missing.txt")).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.txt"));
    }

    #[test]
    fn test_relative_path() {
        let rel = relative_path(Path::new("/work/app"), Path::new("/work/app/Pods/Pods.xcconfig"));
        assert_eq!(rel, PathBuf::from("Pods/Pods.xcconfig"));

        let rel = relative_path(Path::new("/work/app"), Path::new("/work/shared/Base.xcconfig"));
        assert_eq!(rel, PathBuf::from("../shared/Base.xcconfig"));
    }

    #[test]
    fn test_same_file_resolves_dot_dot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("App.project.json");
        write_string(&path, "{}").unwrap();
        std::fs::create_dir_all(tmp.path().join("Pods")).unwrap();

        assert!(same_file(&path, &tmp.path().join("Pods/../App.project.json")));
        assert!(!same_file(&path, &tmp.path().join("Pods/Pods.project.json")));
    }

    #[test]
    fn test_to_document_path() {
        let path = Path::new("Pods").join("Pods.xcconfig");
        assert_eq!(to_document_path(&path), "Pods/Pods.xcconfig");
    }
}
