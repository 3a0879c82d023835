use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, Result};

/// Text file access confined to a single directory tree.
///
/// Every path is canonicalized before use, so `..` segments and symlinks are
/// resolved first and the containment check runs against the real location.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    pub fn new(root: &Path) -> Result<Self> {
        let root = root.canonicalize().map_err(|e| {
            AppError::Config(format!(
                "Failed to resolve sandbox root {}: {e}",
                root.display()
            ))
        })?;

        if !root.is_dir() {
            return Err(AppError::Config(format!(
                "Sandbox root is not a directory: {}",
                root.display()
            )));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a file inside the sandbox as UTF-8 text.
    pub async fn read(&self, path: &Path) -> Result<String> {
        let full_path = self.verify_path(path)?;

        let metadata = match tokio::fs::metadata(&full_path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(AppError::NotAFile(path.to_path_buf()));
        }

        Ok(tokio::fs::read_to_string(&full_path).await?)
    }

    /// Overwrite (or create) a file inside the sandbox.
    pub async fn write(&self, path: &Path, content: &str) -> Result<()> {
        let full_path = self.verify_path(path)?;

        if let Ok(metadata) = tokio::fs::metadata(&full_path).await {
            if metadata.is_dir() {
                return Err(AppError::NotAFile(path.to_path_buf()));
            }
        }

        tokio::fs::write(&full_path, content).await?;
        Ok(())
    }

    /// Resolve `requested` against the root and reject anything that lands outside it.
    ///
    /// Relative paths are taken relative to the root. Paths that do not exist
    /// yet are resolved through their deepest existing ancestor.
    pub fn verify_path(&self, requested: &Path) -> Result<PathBuf> {
        let full_path = self.root.join(requested);

        let canonical = match full_path.canonicalize() {
            Ok(p) => p,
            Err(_) => resolve_missing(&full_path).ok_or_else(|| {
                AppError::Security(format!(
                    "Path '{}' cannot be resolved inside the sandbox",
                    requested.display()
                ))
            })?,
        };

        if !canonical.starts_with(&self.root) {
            return Err(AppError::Security(format!(
                "Path '{}' is outside the allowed sandbox directory '{}'",
                requested.display(),
                self.root.display()
            )));
        }

        Ok(canonical)
    }
}

/// Canonicalize the deepest existing ancestor and re-attach the missing tail.
///
/// Returns `None` when the missing tail still contains `..` or other
/// non-normal components, since those cannot be resolved without the
/// filesystem.
fn resolve_missing(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut tail = Vec::new();

    loop {
        if let Ok(base) = existing.canonicalize() {
            return Some(tail.iter().rev().fold(base, |acc, part| acc.join(part)));
        }

        match existing.components().next_back()? {
            Component::Normal(part) => tail.push(part.to_os_string()),
            _ => return None,
        }
        existing = existing.parent()?;
    }
}
