use scanlog_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid report JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Report {} is unavailable: {reason}", path.display())]
    Unavailable { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    /// Absent reports render as "no data" rather than as failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_not_found())
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Unavailable { .. })
    }
}
