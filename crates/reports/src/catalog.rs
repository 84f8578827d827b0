use scanlog_store::{ArtifactStore, FsStore, SkippedEntry, StoreError};
use std::collections::BTreeMap;
use std::path::Path;

use crate::entry::{ReportEntry, EXECUTION_DIR_PATTERN};

/// Report bundles available under a results root, grouped by model.
///
/// A catalog is a point-in-time view: it is rebuilt on every
/// [`ReportCatalog::discover`] call and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportCatalog {
    by_model: BTreeMap<String, Vec<ReportEntry>>,
    skipped: Vec<SkippedEntry>,
}

/// Scan `root` on the local filesystem.
pub fn discover(root: impl AsRef<Path>) -> ReportCatalog {
    ReportCatalog::discover(&FsStore::new(root))
}

impl ReportCatalog {
    /// Enumerate `<root>/<model>/analise-<id>/report/data/report-data.json`.
    ///
    /// Entries keep directory enumeration order (by name). A missing root yields
    /// an empty catalog; per-model listing failures are recorded in
    /// [`ReportCatalog::skipped`] and do not affect other models.
    pub fn discover(store: &dyn ArtifactStore) -> Self {
        let mut catalog = Self::default();
        let root = store.root();

        let model_dirs = match store.list_child_directories(root) {
            Ok(dirs) => dirs,
            Err(err) if err.is_not_found() => {
                log::info!("Results directory {} does not exist yet", root.display());
                return catalog;
            }
            Err(err) => {
                log::warn!("Cannot list results directory: {err}");
                catalog.record_skip(err);
                return catalog;
            }
        };

        for model_dir in model_dirs {
            let Some(model) = model_dir.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };

            let executions = match store.list_matching(&model_dir, EXECUTION_DIR_PATTERN) {
                Ok(dirs) => dirs,
                Err(err) => {
                    log::warn!("Skipping model {model}: {err}");
                    catalog.record_skip(err);
                    continue;
                }
            };

            for execution_dir in executions {
                let Some(entry) = ReportEntry::from_execution_dir(&model, &execution_dir) else {
                    continue;
                };
                if !store.is_file(&entry.report_path) {
                    log::debug!("No report in {}", execution_dir.display());
                    continue;
                }
                catalog
                    .by_model
                    .entry(model.clone())
                    .or_default()
                    .push(entry);
            }
        }

        log::debug!(
            "Discovered {} reports across {} models",
            catalog.len(),
            catalog.by_model.len()
        );
        catalog
    }

    fn record_skip(&mut self, err: StoreError) {
        self.skipped.push(SkippedEntry {
            path: err.path().map(Path::to_path_buf),
            reason: err.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.by_model.is_empty()
    }

    /// Total number of entries across all models.
    pub fn len(&self) -> usize {
        self.by_model.values().map(Vec::len).sum()
    }

    /// Model names, ascending.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.by_model.keys().map(String::as_str)
    }

    /// Entries of `model` in discovery order.
    pub fn entries(&self, model: &str) -> &[ReportEntry] {
        self.by_model.get(model).map(Vec::as_slice).unwrap_or_default()
    }

    /// Entries of `model`, most recent first.
    ///
    /// Recency is the lexicographic order of execution ids, which holds for the
    /// timestamp-like ids scanlog produces (`YYYYMMDD`, `YYYYMMDD-HHMMSS`).
    pub fn executions_by_recency(&self, model: &str) -> Vec<&ReportEntry> {
        let mut entries: Vec<&ReportEntry> = self.entries(model).iter().collect();
        entries.sort_by(|a, b| b.execution_id.cmp(&a.execution_id));
        entries.dedup_by(|later, earlier| later.execution_id == earlier.execution_id);
        entries
    }

    pub fn latest(&self, model: &str) -> Option<&ReportEntry> {
        self.executions_by_recency(model).into_iter().next()
    }

    pub fn find(&self, model: &str, execution_id: &str) -> Option<&ReportEntry> {
        self.entries(model)
            .iter()
            .find(|entry| entry.execution_id == execution_id)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<ReportEntry>> {
        &self.by_model
    }

    /// Items that could not be enumerated during discovery.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::REPORT_RELATIVE_PATH;
    use pretty_assertions::assert_eq;
    use scanlog_store::{FileMeta, FileWalk, Result as StoreResult};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_report(root: &Path, model: &str, execution: &str, body: &str) {
        let path = root
            .join(model)
            .join(format!("analise-{execution}"))
            .join(REPORT_RELATIVE_PATH);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn missing_root_is_an_empty_catalog() {
        let temp = tempdir().unwrap();
        let catalog = discover(temp.path().join("resultado"));
        assert!(catalog.is_empty());
        assert!(catalog.skipped().is_empty());
    }

    #[test]
    fn models_without_matching_executions_are_absent() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("modelA").join("other-dir")).unwrap();
        fs::create_dir_all(temp.path().join("modelB")).unwrap();
        fs::write(temp.path().join("stray.txt"), b"x").unwrap();

        let catalog = discover(temp.path());
        assert!(catalog.is_empty());
        assert_eq!(catalog.models().count(), 0);
    }

    #[test]
    fn executions_without_report_are_skipped_until_it_appears() {
        let temp = tempdir().unwrap();
        write_report(temp.path(), "modelA", "20240101", "{}");
        fs::create_dir_all(temp.path().join("modelA/analise-20240102/report")).unwrap();

        let catalog = discover(temp.path());
        let ids: Vec<&str> = catalog
            .entries("modelA")
            .iter()
            .map(|e| e.execution_id.as_str())
            .collect();
        assert_eq!(ids, vec!["20240101"]);

        write_report(temp.path(), "modelA", "20240102", "{}");
        let catalog = discover(temp.path());
        assert_eq!(catalog.entries("modelA").len(), 2);
    }

    #[test]
    fn entries_keep_enumeration_order_and_sort_by_recency_on_demand() {
        let temp = tempdir().unwrap();
        write_report(temp.path(), "modelA", "20240102", "{}");
        write_report(temp.path(), "modelA", "20240101", "{}");
        write_report(temp.path(), "modelB", "20231231", "{}");

        let catalog = discover(temp.path());
        assert_eq!(catalog.models().collect::<Vec<_>>(), vec!["modelA", "modelB"]);
        assert_eq!(catalog.len(), 3);

        let discovered: Vec<&str> = catalog
            .entries("modelA")
            .iter()
            .map(|e| e.execution_id.as_str())
            .collect();
        assert_eq!(discovered, vec!["20240101", "20240102"]);

        let recent: Vec<&str> = catalog
            .executions_by_recency("modelA")
            .iter()
            .map(|e| e.execution_id.as_str())
            .collect();
        assert_eq!(recent, vec!["20240102", "20240101"]);
        assert_eq!(catalog.latest("modelA").unwrap().execution_id, "20240102");
        assert!(catalog.latest("missing").is_none());
        assert!(catalog.find("modelB", "20231231").is_some());
    }

    #[test]
    fn report_path_must_be_a_file() {
        let temp = tempdir().unwrap();
        let as_dir = temp
            .path()
            .join("modelA/analise-1")
            .join(REPORT_RELATIVE_PATH);
        fs::create_dir_all(as_dir).unwrap();

        assert!(discover(temp.path()).is_empty());
    }

    /// Delegates to [`FsStore`] but fails to list executions of one model.
    struct FailingModelStore {
        inner: FsStore,
        broken_model: &'static str,
    }

    impl ArtifactStore for FailingModelStore {
        fn root(&self) -> &Path {
            self.inner.root()
        }

        fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.inner.is_dir(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.inner.is_file(path)
        }

        fn canonicalize(&self, path: &Path) -> PathBuf {
            self.inner.canonicalize(path)
        }

        fn list_child_directories(&self, path: &Path) -> StoreResult<Vec<PathBuf>> {
            self.inner.list_child_directories(path)
        }

        fn list_matching(&self, path: &Path, pattern: &str) -> StoreResult<Vec<PathBuf>> {
            if path.ends_with(self.broken_model) {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            self.inner.list_matching(path, pattern)
        }

        fn walk_files(&self, path: &Path) -> StoreResult<FileWalk> {
            self.inner.walk_files(path)
        }

        fn metadata(&self, path: &Path) -> StoreResult<FileMeta> {
            self.inner.metadata(path)
        }

        fn read_bytes(&self, path: &Path) -> StoreResult<Vec<u8>> {
            self.inner.read_bytes(path)
        }

        fn read_to_string(&self, path: &Path) -> StoreResult<String> {
            self.inner.read_to_string(path)
        }

        fn read_prefix(&self, path: &Path, max_bytes: u64) -> StoreResult<Vec<u8>> {
            self.inner.read_prefix(path, max_bytes)
        }
    }

    #[test]
    fn failing_model_is_skipped_without_hiding_siblings() {
        let temp = tempdir().unwrap();
        write_report(temp.path(), "modelA", "20240101", "{}");
        write_report(temp.path(), "modelB", "20240101", "{}");
        write_report(temp.path(), "modelC", "20240101", "{}");

        let store = FailingModelStore {
            inner: FsStore::new(temp.path()),
            broken_model: "modelB",
        };
        let catalog = ReportCatalog::discover(&store);

        assert_eq!(catalog.models().collect::<Vec<_>>(), vec!["modelA", "modelC"]);
        assert_eq!(catalog.skipped().len(), 1);
        let skipped = &catalog.skipped()[0];
        assert_eq!(skipped.path.as_deref(), Some(temp.path().join("modelB").as_path()));
        assert!(skipped.reason.contains("denied"));
    }
}
