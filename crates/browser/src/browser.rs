use scanlog_reports::ReportEntry;
use scanlog_store::{ArtifactStore, SkippedEntry};
use std::path::{Component, Path};
use std::sync::Arc;

use crate::artifact::{ArtifactFileInfo, ArtifactListing};
use crate::error::{BrowserError, Result};
use crate::view::{ArtifactDownload, ArtifactView};

/// Stateless access to the artifacts of an execution folder.
#[derive(Clone)]
pub struct ArtifactBrowser {
    store: Arc<dyn ArtifactStore>,
}

impl std::fmt::Debug for ArtifactBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBrowser")
            .field("root", &self.store.root())
            .finish()
    }
}

impl ArtifactBrowser {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Every regular file under `folder`, sorted by relative path.
    ///
    /// A missing folder is an empty listing. Entries whose metadata cannot be
    /// read are reported in [`ArtifactListing::skipped`] and left out.
    pub fn list_artifacts(&self, folder: &Path) -> ArtifactListing {
        let walk = match self.store.walk_files(folder) {
            Ok(walk) => walk,
            Err(err) if err.is_not_found() => {
                log::debug!("No artifacts folder at {}", folder.display());
                return ArtifactListing::default();
            }
            Err(err) => {
                log::warn!("Cannot list artifacts: {err}");
                return ArtifactListing {
                    files: Vec::new(),
                    skipped: vec![SkippedEntry {
                        path: Some(folder.to_path_buf()),
                        reason: err.to_string(),
                    }],
                };
            }
        };

        ArtifactListing {
            files: walk
                .files
                .into_iter()
                .map(ArtifactFileInfo::from_walked)
                .collect(),
            skipped: walk.skipped,
        }
    }

    /// Artifacts of a report entry (`<folder>/result/extracoes`).
    pub fn list_for_entry(&self, entry: &ReportEntry) -> ArtifactListing {
        self.list_artifacts(&entry.extractions_dir())
    }

    /// Look up `relative_path` in a fresh listing of `folder`.
    pub fn find(&self, folder: &Path, relative_path: &str) -> Result<ArtifactFileInfo> {
        let requested = Path::new(relative_path);
        let escapes = requested.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(BrowserError::OutsideFolder {
                path: requested.to_path_buf(),
            });
        }

        let normalized = requested
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        self.list_artifacts(folder)
            .get(&normalized)
            .cloned()
            .ok_or(BrowserError::UnknownArtifact {
                relative_path: relative_path.to_string(),
            })
    }

    /// Read at most `limit_bytes` of `file` for inline display.
    pub fn open_for_view(
        &self,
        file: &ArtifactFileInfo,
        limit_bytes: usize,
    ) -> Result<ArtifactView> {
        let budget = u64::try_from(limit_bytes)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let prefix = self.store.read_prefix(&file.absolute_path, budget)?;
        let view = ArtifactView::from_prefix(&prefix, limit_bytes, file.size_bytes);
        if view.truncated {
            log::debug!(
                "View of {} truncated at {} of {} bytes",
                file.relative_path,
                view.shown_bytes,
                file.size_bytes
            );
        }
        Ok(view)
    }

    /// Full raw content of `file`, independent of any earlier bounded view.
    pub fn open_for_download(&self, file: &ArtifactFileInfo) -> Result<ArtifactDownload> {
        let bytes = self.store.read_bytes(&file.absolute_path)?;
        Ok(ArtifactDownload {
            file_name: file.file_name(),
            bytes,
        })
    }
}
