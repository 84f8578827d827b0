//! # Scanlog Store
//!
//! Read-only access to the hierarchical results tree produced by scanlog runs.
//!
//! ```text
//! <root>/
//!     <model>/
//!         analise-<execution id>/
//!             report/data/report-data.json
//!             result/extracoes/**      (raw extracted artifacts)
//! ```
//!
//! The store never writes. Every read failure carries the offending path, and
//! "absent" is kept apart from real IO failures so callers can render it as an
//! empty state instead of an error.
//!
//! ## Example
//!
//! ```no_run
//! use scanlog_store::{ArtifactStore, FsStore};
//!
//! let store = FsStore::new("resultado");
//! for model_dir in store.list_child_directories(store.root()).unwrap_or_default() {
//!     println!("{}", model_dir.display());
//! }
//! ```

mod error;
mod fs_store;
mod walk;

pub use error::{Result, StoreError};
pub use fs_store::{ArtifactStore, FileMeta, FsStore};
pub use walk::{FileWalk, SkippedEntry, WalkedFile};
