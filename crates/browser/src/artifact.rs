use chrono::{DateTime, Local};
use scanlog_store::{SkippedEntry, WalkedFile};
use std::path::PathBuf;
use std::time::SystemTime;

/// One extracted artifact, as seen at listing time.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFileInfo {
    /// Path relative to the listed folder, `/`-separated
    pub relative_path: String,
    pub size_bytes: u64,
    /// `size_bytes / 1024`, rounded to two decimals
    pub size_kb: f64,
    pub modified_at: SystemTime,
    pub absolute_path: PathBuf,
}

impl ArtifactFileInfo {
    pub fn from_walked(file: WalkedFile) -> Self {
        Self {
            relative_path: file.relative_path,
            size_bytes: file.meta.len,
            size_kb: size_kb(file.meta.len),
            modified_at: file.meta.modified,
            absolute_path: file.path,
        }
    }

    /// Last path component, used as the download file name.
    pub fn file_name(&self) -> String {
        self.absolute_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.relative_path.clone())
    }

    /// Local modification time as `YYYY-MM-DD HH:MM:SS`.
    pub fn modified_display(&self) -> String {
        DateTime::<Local>::from(self.modified_at)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

fn size_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// Artifacts under a folder plus the entries that could not be inspected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactListing {
    pub files: Vec<ArtifactFileInfo>,
    pub skipped: Vec<SkippedEntry>,
}

impl ArtifactListing {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn get(&self, relative_path: &str) -> Option<&ArtifactFileInfo> {
        self.files
            .binary_search_by(|file| file.relative_path.as_str().cmp(relative_path))
            .ok()
            .map(|idx| &self.files[idx])
    }
}
