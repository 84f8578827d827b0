use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Directory name prefix of one execution inside a model directory.
pub const EXECUTION_DIR_PREFIX: &str = "analise-";
pub const EXECUTION_DIR_PATTERN: &str = "analise-*";

/// Report file location, relative to the execution directory.
pub const REPORT_RELATIVE_PATH: &str = "report/data/report-data.json";

/// Extracted artifacts location, relative to the execution directory.
pub const EXTRACTIONS_RELATIVE_PATH: &str = "result/extracoes";

/// One discovered report bundle. Identity is `(model, execution_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub model: String,
    pub folder: PathBuf,
    pub execution_id: String,
    pub report_path: PathBuf,
}

impl ReportEntry {
    /// Build an entry from an execution directory, if its name carries the execution prefix.
    pub fn from_execution_dir(model: &str, folder: &Path) -> Option<Self> {
        let name = folder.file_name()?.to_str()?;
        let execution_id = name.strip_prefix(EXECUTION_DIR_PREFIX)?;
        Some(Self {
            model: model.to_string(),
            folder: folder.to_path_buf(),
            execution_id: execution_id.to_string(),
            report_path: folder.join(REPORT_RELATIVE_PATH),
        })
    }

    pub fn extractions_dir(&self) -> PathBuf {
        self.folder.join(EXTRACTIONS_RELATIVE_PATH)
    }

    pub fn key(&self) -> ExecutionKey {
        ExecutionKey::new(&self.model, &self.execution_id)
    }
}

/// Namespace for per-execution state; two executions never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExecutionKey {
    pub model: String,
    pub execution_id: String,
}

impl ExecutionKey {
    pub fn new(model: impl Into<String>, execution_id: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            execution_id: execution_id.into(),
        }
    }
}

impl fmt::Display for ExecutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model, self.execution_id)
    }
}
