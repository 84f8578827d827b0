use anyhow::Result;
use scanlog_browser::ArtifactBrowser;
use scanlog_reports::{ReportCache, ReportCatalog, ReportEntry};
use scanlog_store::{ArtifactStore, FsStore};
use std::path::Path;
use std::sync::Arc;

use crate::config::ViewerConfig;

/// Long-lived collaborators of one viewer process: the store, the shared
/// report cache and the artifact browser. The catalog is rescanned per request.
pub struct Viewer {
    config: ViewerConfig,
    store: Arc<dyn ArtifactStore>,
    cache: ReportCache,
    browser: ArtifactBrowser,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let store: Arc<dyn ArtifactStore> = Arc::new(FsStore::new(&config.results_dir));
        let cache = ReportCache::new(Arc::clone(&store), config.cache_capacity);
        let browser = ArtifactBrowser::new(Arc::clone(&store));
        Self {
            config,
            store,
            cache,
            browser,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    pub fn browser(&self) -> &ArtifactBrowser {
        &self.browser
    }

    pub fn results_dir(&self) -> &Path {
        self.store.root()
    }

    pub fn catalog(&self) -> ReportCatalog {
        let catalog = ReportCatalog::discover(self.store.as_ref());
        for skipped in catalog.skipped() {
            log::warn!("Skipped during discovery: {}", skipped.reason);
        }
        catalog
    }

    pub fn no_reports_message(&self) -> String {
        format!(
            "No reports found under {}. Run scanlog before opening the viewer.",
            self.results_dir().display()
        )
    }

    /// Entry for `model`, either the requested execution or the most recent one.
    pub fn resolve_entry(
        &self,
        catalog: &ReportCatalog,
        model: &str,
        execution: Option<&str>,
    ) -> Result<ReportEntry> {
        if catalog.entries(model).is_empty() {
            let known: Vec<&str> = catalog.models().collect();
            if known.is_empty() {
                anyhow::bail!("{}", self.no_reports_message());
            }
            anyhow::bail!(
                "No analysis available for model '{model}' (known: {})",
                known.join(", ")
            );
        }

        let entry = match execution {
            Some(id) => catalog.find(model, id).ok_or_else(|| {
                anyhow::anyhow!("Model '{model}' has no execution '{id}'")
            })?,
            None => catalog
                .latest(model)
                .ok_or_else(|| anyhow::anyhow!("Model '{model}' has no executions"))?,
        };
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanlog_reports::REPORT_RELATIVE_PATH;
    use std::fs;
    use tempfile::tempdir;

    fn viewer_with(root: &std::path::Path) -> Viewer {
        Viewer::new(ViewerConfig {
            results_dir: root.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn resolves_latest_or_requested_execution() {
        let temp = tempdir().unwrap();
        for id in ["20240101", "20240102"] {
            let path = temp
                .path()
                .join("modelA")
                .join(format!("analise-{id}"))
                .join(REPORT_RELATIVE_PATH);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"{}").unwrap();
        }

        let viewer = viewer_with(temp.path());
        let catalog = viewer.catalog();
        let latest = viewer.resolve_entry(&catalog, "modelA", None).unwrap();
        assert_eq!(latest.execution_id, "20240102");
        let picked = viewer
            .resolve_entry(&catalog, "modelA", Some("20240101"))
            .unwrap();
        assert_eq!(picked.execution_id, "20240101");

        let err = viewer
            .resolve_entry(&catalog, "modelA", Some("1999"))
            .unwrap_err();
        assert!(err.to_string().contains("1999"));
        let err = viewer.resolve_entry(&catalog, "modelZ", None).unwrap_err();
        assert!(err.to_string().contains("modelA"));
    }

    #[test]
    fn empty_root_explains_how_to_get_reports() {
        let temp = tempdir().unwrap();
        let viewer = viewer_with(&temp.path().join("resultado"));
        let catalog = viewer.catalog();
        assert!(catalog.is_empty());
        let err = viewer.resolve_entry(&catalog, "modelA", None).unwrap_err();
        assert!(err.to_string().contains("Run scanlog"));
    }
}
