use globset::GlobBuilder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Result, StoreError};
use crate::walk::{self, FileWalk};

/// Filesystem metadata snapshot for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub len: u64,
    pub modified: SystemTime,
    pub is_file: bool,
    pub is_dir: bool,
}

impl FileMeta {
    pub(crate) fn from_std(meta: &fs::Metadata) -> Self {
        Self {
            len: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            is_file: meta.is_file(),
            is_dir: meta.is_dir(),
        }
    }
}

/// Read-only view over a hierarchical key/value store of files.
///
/// Relative paths are resolved against [`ArtifactStore::root`]; absolute paths
/// are used as given. Every listing is sorted by name so callers get a
/// deterministic order regardless of the platform's enumeration order.
pub trait ArtifactStore: Send + Sync {
    fn root(&self) -> &Path;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// Identity of `path` inside the store: resolved against the root and, when
    /// the entry exists, with links and `..` segments removed.
    fn canonicalize(&self, path: &Path) -> PathBuf;

    /// Immediate subdirectories of `path`, sorted by name.
    fn list_child_directories(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Immediate children of `path` whose name matches the glob `pattern`, sorted by name.
    fn list_matching(&self, path: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// All regular files below `path`, sorted by relative path.
    fn walk_files(&self, path: &Path) -> Result<FileWalk>;

    fn metadata(&self, path: &Path) -> Result<FileMeta>;

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// At most `max_bytes` bytes from the start of the file.
    fn read_prefix(&self, path: &Path, max_bytes: u64) -> Result<Vec<u8>>;
}

/// [`ArtifactStore`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// The root is made absolute up front so every path handed out by the store
    /// can be passed back to it unchanged.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            root: std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn sorted_children(&self, path: &Path) -> Result<Vec<(String, PathBuf)>> {
        let dir = self.resolve(path);
        let reader = fs::read_dir(&dir).map_err(|err| StoreError::from_io(&dir, err))?;

        let mut children = Vec::new();
        for entry in reader {
            match entry {
                Ok(entry) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    children.push((name, entry.path()));
                }
                Err(err) => log::warn!("Failed to read entry in {}: {err}", dir.display()),
            }
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children)
    }
}

impl ArtifactStore for FsStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        let resolved = self.resolve(path);
        fs::canonicalize(&resolved).unwrap_or(resolved)
    }

    fn list_child_directories(&self, path: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .sorted_children(path)?
            .into_iter()
            .filter(|(_, child)| child.is_dir())
            .map(|(_, child)| child)
            .collect())
    }

    fn list_matching(&self, path: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|err| StoreError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })?
            .compile_matcher();

        Ok(self
            .sorted_children(path)?
            .into_iter()
            .filter(|(name, _)| matcher.is_match(name))
            .map(|(_, child)| child)
            .collect())
    }

    fn walk_files(&self, path: &Path) -> Result<FileWalk> {
        walk::walk_files(&self.resolve(path))
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        let path = self.resolve(path);
        fs::metadata(&path)
            .map(|meta| FileMeta::from_std(&meta))
            .map_err(|err| StoreError::from_io(path, err))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let path = self.resolve(path);
        fs::read(&path).map_err(|err| StoreError::from_io(path, err))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.resolve(path);
        fs::read_to_string(&path).map_err(|err| StoreError::from_io(path, err))
    }

    fn read_prefix(&self, path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
        let path = self.resolve(path);
        let file = fs::File::open(&path).map_err(|err| StoreError::from_io(&path, err))?;

        let mut buf = Vec::new();
        file.take(max_bytes)
            .read_to_end(&mut buf)
            .map_err(|err| StoreError::from_io(&path, err))?;
        Ok(buf)
    }
}
