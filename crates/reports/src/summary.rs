use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::ReportDocument;
use crate::entry::ReportEntry;

/// Shown when a report does not carry `geradoEm`.
pub const GENERATED_AT_FALLBACK: &str = "N/D";

/// Response-time percentiles of an execution, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Performance {
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl Performance {
    /// Missing or non-numeric metrics read as zero.
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        let metric = |key: &str| obj.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        Self {
            mean_ms: metric("media_ms"),
            min_ms: metric("min_ms"),
            max_ms: metric("max_ms"),
            p50_ms: metric("p50_ms"),
            p95_ms: metric("p95_ms"),
            p99_ms: metric("p99_ms"),
        }
    }

    /// `(label, value)` pairs in display order.
    pub fn metrics(&self) -> [(&'static str, f64); 6] {
        [
            ("mean", self.mean_ms),
            ("min", self.min_ms),
            ("max", self.max_ms),
            ("p50", self.p50_ms),
            ("p95", self.p95_ms),
            ("p99", self.p99_ms),
        ]
    }
}

/// Headline figures of one report, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub model: String,
    pub execution_id: String,
    pub source: String,
    pub generated_at: String,
    pub indicator_count: usize,
    pub total_events: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
}

impl ReportSummary {
    pub fn from_document(entry: &ReportEntry, doc: &ReportDocument) -> Self {
        Self {
            model: entry.model.clone(),
            execution_id: entry.execution_id.clone(),
            source: doc
                .source()
                .map(str::to_string)
                .unwrap_or_else(|| entry.folder.display().to_string()),
            generated_at: doc
                .generated_at()
                .unwrap_or(GENERATED_AT_FALLBACK)
                .to_string(),
            indicator_count: doc.counters().len(),
            total_events: doc.total_events(),
            performance: doc.performance().map(Performance::from_json),
        }
    }
}

/// Round to a whole number and group thousands with `.`: `1234567.4` → `1.234.567`.
///
/// Used for event counts and millisecond metrics alike.
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (idx, ch) in rounded.chars().enumerate() {
        if idx > 0 && (rounded.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0.0 && grouped != "0" {
        grouped.insert(0, '-');
    }
    grouped
}
