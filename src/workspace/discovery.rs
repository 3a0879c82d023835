use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::DiscoveryConfig;
use crate::error::Result;

/// Directories never worth descending into.
const SKIPPED_DIRS: &[&str] = &["__pycache__", "venv", "node_modules", "target"];

/// List candidate files under `root`, relative to it and sorted.
pub fn discover(root: &Path, config: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).follow_links(false);
    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                tracing::warn!(error = %e, "Skipping unreadable entry during discovery");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !entry.file_type().is_file() && !entry.path_is_symlink() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(config.extension.as_str()) {
            continue;
        }

        if !config.include_tests && is_test_file(path) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        files.push(relative);
    }

    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "Discovered files");
    Ok(files)
}

/// `test_*` and `*_test` files hold tests rather than code under repair.
pub fn is_test_file(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    stem.starts_with("test_") || stem.ends_with("_test")
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}
