//! # Scanlog Reports
//!
//! Discovery and loading of the per-model, per-execution report bundles that
//! scanlog writes under its results directory.
//!
//! ## Flow
//!
//! ```text
//! ArtifactStore
//!     │
//!     ├──> ReportCatalog::discover
//!     │      └─> model → [ReportEntry] (enumeration order)
//!     │
//!     └──> ReportCache::load(entry.report_path)
//!            └─> Arc<ReportDocument> (bounded LRU, keyed by canonical path)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use scanlog_reports::{ReportCache, ReportCatalog};
//! use scanlog_store::FsStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(FsStore::new("resultado"));
//! let catalog = ReportCatalog::discover(store.as_ref());
//! let cache = ReportCache::new(store.clone(), 64);
//!
//! for model in catalog.models() {
//!     if let Some(entry) = catalog.latest(model) {
//!         let doc = cache.load(&entry.report_path);
//!         println!("{model}/{}: loaded={}", entry.execution_id, doc.is_some());
//!     }
//! }
//! ```

mod cache;
mod catalog;
mod document;
mod entry;
mod error;
mod export;
mod summary;

pub use cache::{ReportCache, DEFAULT_CACHE_CAPACITY};
pub use catalog::{discover, ReportCatalog};
pub use document::{ReportDocument, ReportSection};
pub use entry::{
    ExecutionKey, ReportEntry, EXECUTION_DIR_PATTERN, EXECUTION_DIR_PREFIX,
    EXTRACTIONS_RELATIVE_PATH, REPORT_RELATIVE_PATH,
};
pub use error::{ReportError, Result};
pub use export::{export_report, ReportExport, DEFAULT_EXPORT_PREFIX};
pub use summary::{group_thousands, Performance, ReportSummary, GENERATED_AT_FALLBACK};
