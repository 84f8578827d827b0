use scanlog_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Path escapes the artifact folder: {}", path.display())]
    OutsideFolder { path: PathBuf },

    #[error("No artifact named '{relative_path}'")]
    UnknownArtifact { relative_path: String },
}

impl BrowserError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Store(err) => err.is_not_found(),
            Self::UnknownArtifact { .. } => true,
            Self::OutsideFolder { .. } => false,
        }
    }
}
