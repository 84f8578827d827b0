use scanlog_browser::{preferred_height, ArtifactListing};
use scanlog_reports::{
    group_thousands, ReportCatalog, ReportDocument, ReportSection, ReportSummary,
};
use serde_json::Value;

pub fn render_models(catalog: &ReportCatalog) -> String {
    let rows: Vec<Vec<String>> = catalog
        .models()
        .map(|model| {
            let latest = catalog
                .latest(model)
                .map(|entry| entry.execution_id.clone())
                .unwrap_or_default();
            vec![
                model.to_string(),
                catalog.entries(model).len().to_string(),
                latest,
            ]
        })
        .collect();
    markdown_table(&["model", "executions", "latest"], &rows)
}

pub fn render_summary(summary: &ReportSummary, doc: &ReportDocument) -> String {
    let mut md = String::new();
    md.push_str(&format!(
        "# Summary - {} ({})\n\n",
        summary.model.to_uppercase(),
        summary.execution_id
    ));
    md.push_str(&format!("- Source file: `{}`\n", summary.source));
    md.push_str(&format!("- Generated at: {}\n", summary.generated_at));
    md.push_str(&format!(
        "- Indicators monitored: {}\n",
        summary.indicator_count
    ));
    md.push_str(&format!(
        "- Total events recorded: {}\n\n",
        group_thousands(summary.total_events)
    ));

    match &summary.performance {
        Some(perf) => {
            md.push_str("## Performance (ms)\n\n");
            let labels: Vec<&str> = perf.metrics().iter().map(|(label, _)| *label).collect();
            let values = vec![perf.metrics().iter().map(|(_, v)| group_thousands(*v)).collect()];
            md.push_str(&markdown_table(&labels, &values));
            md.push('\n');
        }
        None => md.push_str("No performance data.\n\n"),
    }

    for section in ReportSection::ALL {
        let rows = doc.rows(section);
        if rows.is_empty() {
            md.push_str(&format!(
                "No data for {}.\n\n",
                section.title().to_lowercase()
            ));
            continue;
        }
        md.push_str(&format!(
            "## {} ({} rows, height {})\n\n",
            section.title(),
            rows.len(),
            preferred_height(rows.len())
        ));
        md.push_str(&json_rows_table(rows));
        md.push('\n');
    }

    md
}

pub fn render_artifacts(listing: &ArtifactListing) -> String {
    let rows: Vec<Vec<String>> = listing
        .files
        .iter()
        .enumerate()
        .map(|(idx, file)| {
            vec![
                (idx + 1).to_string(),
                file.relative_path.clone(),
                format!("{:.2}", file.size_kb),
                file.modified_display(),
            ]
        })
        .collect();
    markdown_table(&["#", "file", "size (KB)", "updated at"], &rows)
}

/// Table over JSON row objects; columns in order of first appearance.
pub fn json_rows_table(rows: &[Value]) -> String {
    let mut headers: Vec<&str> = Vec::new();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
        }
    }
    if headers.is_empty() {
        let cells = rows.iter().map(|row| vec![cell_text(row)]).collect::<Vec<_>>();
        return markdown_table(&["value"], &cells);
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|key| row.get(*key).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    markdown_table(&headers, &cells)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn markdown_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut md = String::new();
    md.push('|');
    for header in headers {
        md.push_str(&format!(" {} |", escape_cell(header.as_ref())));
    }
    md.push_str("\n|");
    for _ in headers {
        md.push_str("---|");
    }
    md.push('\n');
    for row in rows {
        md.push('|');
        for cell in row {
            md.push_str(&format!(" {} |", escape_cell(cell)));
        }
        md.push('\n');
    }
    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
