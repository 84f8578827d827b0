use serde::Serialize;

use crate::document::ReportDocument;
use crate::error::Result;

pub const DEFAULT_EXPORT_PREFIX: &str = "scanlog";

/// A report rendered for download: `<prefix>-<model>-<execution id>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportExport {
    pub file_name: String,
    pub contents: String,
}

/// Pretty-print the whole document, unknown keys included, with 2-space
/// indentation and non-ASCII text kept as is.
pub fn export_report(
    doc: &ReportDocument,
    prefix: &str,
    model: &str,
    execution_id: &str,
) -> Result<ReportExport> {
    Ok(ReportExport {
        file_name: format!("{prefix}-{model}-{execution_id}.json"),
        contents: serde_json::to_string_pretty(doc)?,
    })
}
