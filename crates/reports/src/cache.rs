use lru::LruCache;
use scanlog_store::ArtifactStore;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::document::ReportDocument;
use crate::error::{ReportError, Result};

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Clone)]
enum CachedReport {
    Ready(Arc<ReportDocument>),
    /// Content that failed to parse; the file is immutable once written, so the
    /// failure is remembered until evicted.
    Unavailable(Arc<str>),
}

/// Bounded, shareable memo of parsed reports keyed by canonical path.
///
/// Keys are kept as [`PathBuf`] so names that are not valid UTF-8 still map to
/// exactly one file.
///
/// Reads and parsing run outside the lock. When two callers race on the same
/// key the first stored snapshot wins and both observe it.
pub struct ReportCache {
    store: Arc<dyn ArtifactStore>,
    entries: Mutex<LruCache<PathBuf, CachedReport>>,
}

impl fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.lock();
        f.debug_struct("ReportCache")
            .field("root", &self.store.root())
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

impl ReportCache {
    /// A zero capacity is raised to one entry.
    pub fn new(store: Arc<dyn ArtifactStore>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_default_capacity(store: Arc<dyn ArtifactStore>) -> Self {
        Self::new(store, DEFAULT_CACHE_CAPACITY)
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<PathBuf, CachedReport>> {
        // Values are immutable snapshots, so a poisoned map is still consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cache key for `path`, as canonicalized by the store. The key is also the
    /// path the report is read from.
    pub fn key_for(&self, path: &Path) -> PathBuf {
        self.store.canonicalize(path)
    }

    /// Parsed report at `path`, or `None` when it cannot be read or parsed.
    ///
    /// The failure is logged; use [`ReportCache::try_load`] to show it to the user.
    pub fn load(&self, path: &Path) -> Option<Arc<ReportDocument>> {
        match self.try_load(path) {
            Ok(doc) => Some(doc),
            Err(err) if err.is_not_found() => {
                log::info!("No report at {}", path.display());
                None
            }
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }

    pub fn try_load(&self, path: &Path) -> Result<Arc<ReportDocument>> {
        let key = self.key_for(path);

        let cached = self.lock().get(&key).cloned();
        if let Some(cached) = cached {
            log::debug!("Report cache hit: {}", key.display());
            return Self::unwrap_cached(path, cached);
        }
        log::debug!("Report cache miss: {}", key.display());

        let bytes = self.store.read_bytes(&key)?;
        let outcome = match ReportDocument::from_slice(&bytes) {
            Ok(doc) => Ok(Arc::new(doc)),
            Err(source) => Err(ReportError::Parse {
                path: key.clone(),
                source,
            }),
        };

        let value = match &outcome {
            Ok(doc) => CachedReport::Ready(Arc::clone(doc)),
            Err(err) => CachedReport::Unavailable(Arc::from(err.to_string())),
        };

        let mut entries = self.lock();
        if let Some(existing) = entries.get(&key).cloned() {
            drop(entries);
            return Self::unwrap_cached(path, existing);
        }
        if let Some((evicted, _)) = entries.push(key.clone(), value) {
            if evicted != key {
                log::debug!("Report cache evicted: {}", evicted.display());
            }
        }
        drop(entries);

        outcome
    }

    fn unwrap_cached(path: &Path, cached: CachedReport) -> Result<Arc<ReportDocument>> {
        match cached {
            CachedReport::Ready(doc) => Ok(doc),
            CachedReport::Unavailable(reason) => Err(ReportError::Unavailable {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            }),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        let key = self.key_for(path);
        self.lock().contains(&key)
    }

    /// Forget `path`; the next load re-reads it.
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = self.key_for(path);
        self.lock().pop(&key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scanlog_store::FsStore;
    use std::fs;
    use tempfile::tempdir;

    fn cache_at(root: &Path, capacity: usize) -> ReportCache {
        ReportCache::new(Arc::new(FsStore::new(root)), capacity)
    }

    #[test]
    fn repeated_loads_share_the_parsed_snapshot() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("report.json");
        fs::write(&path, br#"{"contadores":[{"quantidade":5}]}"#).unwrap();

        let cache = cache_at(temp.path(), 4);
        let first = cache.load(&path).unwrap();

        // A rewrite is not observed while the entry is cached.
        fs::write(&path, br#"{"contadores":[]}"#).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.total_events(), 5.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn relative_and_absolute_paths_share_a_key() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("r.json"), b"{}").unwrap();

        let cache = cache_at(temp.path(), 4);
        let a = cache.load(Path::new("r.json")).unwrap();
        let b = cache.load(&temp.path().join("r.json")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn eviction_triggers_a_fresh_equal_read() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.json");
        let b = temp.path().join("b.json");
        fs::write(&a, br#"{"fonte":"a.log"}"#).unwrap();
        fs::write(&b, br#"{"fonte":"b.log"}"#).unwrap();

        let cache = cache_at(temp.path(), 1);
        let first = cache.load(&a).unwrap();
        cache.load(&b).unwrap();
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));

        let reloaded = cache.load(&a).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(*first, *reloaded);
    }

    #[test]
    fn missing_report_is_none_and_not_cached() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("late.json");
        let cache = cache_at(temp.path(), 4);

        assert!(cache.load(&path).is_none());
        assert!(cache.try_load(&path).unwrap_err().is_not_found());
        assert!(cache.is_empty());

        fs::write(&path, b"{}").unwrap();
        assert!(cache.load(&path).is_some());
    }

    #[test]
    fn malformed_report_is_remembered_as_unavailable() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, b"{not json").unwrap();
        let cache = cache_at(temp.path(), 4);

        let first = cache.try_load(&path).unwrap_err();
        assert!(matches!(first, ReportError::Parse { .. }));
        assert!(cache.load(&path).is_none());

        let second = cache.try_load(&path).unwrap_err();
        assert!(matches!(second, ReportError::Unavailable { .. }));
        assert!(second.is_parse_failure());

        assert!(cache.invalidate(&path));
        fs::write(&path, b"{}").unwrap();
        assert!(cache.load(&path).is_some());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_report_paths_load_from_the_real_file() {
        use crate::catalog::ReportCatalog;
        use crate::entry::REPORT_RELATIVE_PATH;
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = tempdir().unwrap();
        let model = OsStr::from_bytes(b"modelo-\xE7");
        let report = temp
            .path()
            .join(model)
            .join("analise-20240101")
            .join(REPORT_RELATIVE_PATH);
        fs::create_dir_all(report.parent().unwrap()).unwrap();
        fs::write(&report, br#"{"contadores":[{"quantidade":7}]}"#).unwrap();

        let store = Arc::new(FsStore::new(temp.path()));
        let catalog = ReportCatalog::discover(store.as_ref());
        let model_name = catalog.models().next().unwrap().to_string();
        let entry = catalog.latest(&model_name).unwrap().clone();
        assert_eq!(entry.report_path, report);

        let cache = ReportCache::new(store, 4);
        let doc = cache.try_load(&entry.report_path).unwrap();
        assert_eq!(doc.total_events(), 7.0);
        assert!(cache.contains(&report));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let temp = tempdir().unwrap();
        assert_eq!(cache_at(temp.path(), 0).capacity(), 1);
        assert_eq!(
            ReportCache::with_default_capacity(Arc::new(FsStore::new(temp.path()))).capacity(),
            DEFAULT_CACHE_CAPACITY
        );
    }

    #[test]
    fn concurrent_loads_observe_one_snapshot() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("shared.json");
        fs::write(&path, br#"{"geradoEm":"2024-01-02 10:00:00"}"#).unwrap();
        let cache = Arc::new(cache_at(temp.path(), 8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let path = path.clone();
                std::thread::spawn(move || cache.load(&path).unwrap())
            })
            .collect();
        let docs: Vec<Arc<ReportDocument>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let stored = cache.load(&path).unwrap();
        assert!(docs.iter().all(|doc| Arc::ptr_eq(doc, &stored)));
        assert_eq!(cache.len(), 1);
    }
}
