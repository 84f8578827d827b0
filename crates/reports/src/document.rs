use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed `report-data.json`.
///
/// The document is kept as the JSON object it was read from so that unknown
/// keys survive export untouched; the accessors below are read-only typed
/// views over the recognized keys. Absent or mistyped keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportDocument {
    raw: Map<String, Value>,
}

/// Tabular sections of a report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportSection {
    Counters,
    BusinessMessages,
    TopMethods,
    TopMethodUsage,
    TopClasses,
    TopModules,
    TopModulesBySubsystem,
}

impl ReportSection {
    pub const ALL: [ReportSection; 7] = [
        ReportSection::Counters,
        ReportSection::BusinessMessages,
        ReportSection::TopMethods,
        ReportSection::TopMethodUsage,
        ReportSection::TopClasses,
        ReportSection::TopModules,
        ReportSection::TopModulesBySubsystem,
    ];

    /// Top-level JSON key holding the section rows.
    pub fn key(self) -> &'static str {
        match self {
            Self::Counters => "contadores",
            Self::BusinessMessages => "mensagensNegocio",
            Self::TopMethods => "topMetodos",
            Self::TopMethodUsage => "topUsoMetodos",
            Self::TopClasses => "topClasses",
            Self::TopModules => "topModulos",
            Self::TopModulesBySubsystem => "topModulosSubsistema",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Counters => "General counters",
            Self::BusinessMessages => "Business messages",
            Self::TopMethods => "Heaviest methods",
            Self::TopMethodUsage => "Method usage (stacktrace)",
            Self::TopClasses => "Most used classes",
            Self::TopModules => "Heaviest modules",
            Self::TopModulesBySubsystem => "Top modules by subsystem",
        }
    }
}

impl ReportDocument {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn as_json(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Source log the report was generated from (`fonte`).
    pub fn source(&self) -> Option<&str> {
        self.raw.get("fonte").and_then(Value::as_str)
    }

    /// Generation timestamp as written by the generator (`geradoEm`).
    pub fn generated_at(&self) -> Option<&str> {
        self.raw.get("geradoEm").and_then(Value::as_str)
    }

    /// Rows of `section`; empty when the key is absent or not an array.
    pub fn rows(&self, section: ReportSection) -> &[Value] {
        self.raw
            .get(section.key())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn counters(&self) -> &[Value] {
        self.rows(ReportSection::Counters)
    }

    /// Sum of `quantidade` over the counter rows; rows without it count as zero.
    pub fn total_events(&self) -> f64 {
        self.counters()
            .iter()
            .filter_map(|row| row.get("quantidade"))
            .filter_map(Value::as_f64)
            .sum()
    }

    /// The `desempenho` object, when present and non-empty.
    pub fn performance(&self) -> Option<&Map<String, Value>> {
        self.raw
            .get("desempenho")
            .and_then(Value::as_object)
            .filter(|obj| !obj.is_empty())
    }
}
