//! Generated project writer
//!
//! Materializes extracted code blocks under the project root. Every path is
//! checked lexically before any I/O. The deepest existing ancestor is then
//! resolved before any directory is created, and the parent again once it
//! exists, so a symlink cannot redirect a write or a mkdir outside the root.

use sdk::errors::EngineError;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Scaffold directories created alongside the project root
pub const SCAFFOLD_DIRS: [&str; 2] = ["src", "docs"];

#[derive(Debug, Clone)]
pub struct ProjectWriter {
    root: PathBuf,
}

impl ProjectWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the project root plus the fixed scaffold directories.
    pub async fn create_project_structure(&self) -> Result<(), EngineError> {
        for dir in std::iter::once(self.root.clone())
            .chain(SCAFFOLD_DIRS.iter().map(|d| self.root.join(d)))
        {
            fs::create_dir_all(&dir)
                .await
                .map_err(|source| EngineError::ProjectStructure {
                    path: dir.clone(),
                    source,
                })?;
        }

        info!(root = %self.root.display(), "Created project structure");
        Ok(())
    }

    /// Write `content` to `relative_path` under the root, creating parents and
    /// overwriting any existing file. Returns the full path written.
    pub async fn write_file(
        &self,
        relative_path: &str,
        content: &str,
    ) -> Result<PathBuf, EngineError> {
        let relative = normalize_relative(relative_path)?;
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(&self.root).await?;
            let existing = existing_ancestor(parent).await;
            self.ensure_inside(&existing, relative_path).await?;

            fs::create_dir_all(parent).await?;
            self.ensure_inside(parent, relative_path).await?;
        }

        fs::write(&target, content).await?;

        debug!(
            path = %relative.display(),
            bytes = content.len(),
            "Wrote generated file"
        );
        Ok(target)
    }

    async fn ensure_inside(&self, dir: &Path, requested: &str) -> Result<(), EngineError> {
        let root = fs::canonicalize(&self.root).await?;
        let resolved = fs::canonicalize(dir).await?;

        if resolved.starts_with(&root) {
            Ok(())
        } else {
            Err(EngineError::PathOutsideProject(PathBuf::from(requested)))
        }
    }
}

/// Deepest ancestor of `path` (itself included) that exists on disk.
async fn existing_ancestor(path: &Path) -> PathBuf {
    for ancestor in path.ancestors() {
        if fs::metadata(ancestor).await.is_ok() {
            return ancestor.to_path_buf();
        }
    }
    path.to_path_buf()
}

/// Reject absolute paths and any `..` that climbs above the root.
///
/// `./` segments are dropped; `a/../b` is accepted and folded to `b`.
pub fn normalize_relative(path: &str) -> Result<PathBuf, EngineError> {
    let outside = || EngineError::PathOutsideProject(PathBuf::from(path));
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(path.trim()).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop().ok_or_else(outside)?;
            }
            Component::RootDir | Component::Prefix(_) => return Err(outside()),
        }
    }

    if parts.is_empty() {
        return Err(outside());
    }

    Ok(parts.iter().collect())
}
