//! Vertical card display for query analyses.
//!
//! Renders an [`Analysis`] as a grouped, human-readable card: narrative,
//! per-year trend, then a short sample of the matched rows.

use std::fmt;

use realty_api::Analysis;
use serde_json::Value;

const MAX_SAMPLE_ROWS: usize = 5;
const LABEL_WIDTH: usize = 26;
const WRAP_WIDTH: usize = 76;

pub struct AnalysisCard<'a>(pub &'a Analysis);

impl fmt::Display for AnalysisCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.0;
        writeln!(f, "=== {} ===", analysis.meta.areas.join(", "))?;
        writeln!(f, "{} rows returned", analysis.meta.rows_returned)?;
        writeln!(f)?;

        writeln!(f, "Summary")?;
        for line in wrap(&analysis.summary, WRAP_WIDTH) {
            writeln!(f, "  {line}")?;
        }
        writeln!(f)?;

        write_trend(f, analysis)?;
        write_sample(f, analysis)
    }
}

// ── Sections ──

fn write_trend(f: &mut fmt::Formatter<'_>, analysis: &Analysis) -> fmt::Result {
    let chart = &analysis.chart;
    if chart.is_empty() {
        return Ok(());
    }

    writeln!(f, "Yearly Trend")?;
    writeln!(f, "  {:<8}{:>14}{:>14}", "year", "avg price", "avg demand")?;
    for (i, year) in chart.years.iter().enumerate() {
        writeln!(
            f,
            "  {:<8}{:>14}{:>14}",
            year,
            amount(chart.price.get(i).copied().flatten()),
            amount(chart.demand.get(i).copied().flatten()),
        )?;
    }
    writeln!(f)
}

fn write_sample(f: &mut fmt::Formatter<'_>, analysis: &Analysis) -> fmt::Result {
    let rows = &analysis.table;
    if rows.is_empty() {
        return Ok(());
    }

    writeln!(f, "Sample Rows")?;
    for (i, row) in rows.iter().take(MAX_SAMPLE_ROWS).enumerate() {
        writeln!(f, "  #{}", i + 1)?;
        for (name, value) in row {
            writeln!(f, "    {:<LABEL_WIDTH$} {}", name, cell(value))?;
        }
    }
    if rows.len() > MAX_SAMPLE_ROWS {
        writeln!(f, "  ... and {} more", rows.len() - MAX_SAMPLE_ROWS)?;
    }
    Ok(())
}

// ── Helpers ──

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
