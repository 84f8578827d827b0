use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::fs_store::FileMeta;

/// Regular file found under a walked folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Absolute (or store-resolved) path of the file
    pub path: PathBuf,
    /// Path relative to the walked folder, `/`-separated
    pub relative_path: String,
    pub meta: FileMeta,
}

/// Entry that could not be inspected during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// Best-effort recursive listing: unreadable entries end up in `skipped`
/// instead of aborting the walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileWalk {
    pub files: Vec<WalkedFile>,
    pub skipped: Vec<SkippedEntry>,
}

impl FileWalk {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub(crate) fn walk_files(folder: &Path) -> Result<FileWalk> {
    match std::fs::metadata(folder) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(StoreError::NotFound {
                path: folder.to_path_buf(),
            })
        }
        Err(err) => return Err(StoreError::from_io(folder, err)),
    }

    let mut walk = FileWalk::default();

    // Artifacts are raw extracts: hidden and git-ignored files are still artifacts.
    let mut builder = WalkBuilder::new(folder);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Failed to read entry under {}: {err}", folder.display());
                walk.skipped.push(SkippedEntry {
                    path: None,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        if entry.depth() == 0 {
            continue;
        }

        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(err) => {
                log::warn!("Skipping unreadable entry {}: {err}", path.display());
                walk.skipped.push(SkippedEntry {
                    path: Some(path.to_path_buf()),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }

        let Some(relative_path) = normalize_relative_path(folder, path) else {
            continue;
        };

        walk.files.push(WalkedFile {
            path: path.to_path_buf(),
            relative_path,
            meta: FileMeta::from_std(&meta),
        });
    }

    walk.files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::debug!(
        "Walked {}: {} files, {} skipped",
        folder.display(),
        walk.files.len(),
        walk.skipped.len()
    );
    Ok(walk)
}

pub(crate) fn normalize_relative_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            std::path::Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
