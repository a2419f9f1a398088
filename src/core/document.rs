//! Lazily loaded project documents.
//!
//! Each integration unit owns its own handles, so a unit always reads the
//! state left on disk by the units that ran before it.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::project::Project;

/// A project document loaded from `path` on first access and cached.
#[derive(Debug)]
pub struct LazyProject {
    path: PathBuf,
    cached: Option<Project>,
}

impl LazyProject {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LazyProject {
            path: path.into(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// The document, loading it if this is the first access.
    pub fn get(&mut self) -> Result<&Project> {
        self.get_mut().map(|project| &*project)
    }

    /// Mutable access to the document, loading it if needed.
    pub fn get_mut(&mut self) -> Result<&mut Project> {
        let project = match self.cached.take() {
            Some(project) => project,
            None => {
                tracing::debug!("loading project document {}", self.path.display());
                Project::load(&self.path)?
            }
        };
        Ok(self.cached.insert(project))
    }

    /// Drop the cached document; the next access reads the file again.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Write the document back to its path, loading it first if needed.
    pub fn persist(&mut self) -> Result<()> {
        let project = self.get()?;
        tracing::debug!("saving project document {}", project.path().display());
        project.save()
    }
}
