//! Result export.
//!
//! Builds a flat table from the audited communities and renders it as CSV,
//! JSON, or a Markdown table. The `pos_links` column expands into one
//! (url, status, diagnostics) triple per link, sized by the widest widget in
//! the run, so every row has the same column count.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use poslint_core::config::DisplayConfig;
use poslint_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Md,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Md),
            other => Err(anyhow!("unsupported export format: {other}")),
        }
    }

    /// Explicit `--format` wins; otherwise the out-file extension decides,
    /// defaulting to CSV when there is none.
    pub fn resolve(format: Option<&str>, out_path: &str) -> Result<Self> {
        if let Some(f) = format {
            return Self::parse(f);
        }
        match Path::new(out_path).extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::parse(ext)
                .with_context(|| format!("cannot infer format from file name {out_path}")),
            None => Ok(Self::Csv),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Md => "md",
        }
    }
}

/// A rendered result table.
#[derive(Debug, Clone)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Flatten the audited communities into a table.
///
/// `fields` drives the columns: `url` is the community URL, `pos_result` the
/// widget verdict text, `pos_links` the per-link triples; anything else is a
/// dotted payload lookup.
pub fn build_table(
    publics: &[Public],
    display: &DisplayConfig,
    fields: &[String],
    skip_correct: bool,
) -> ResultTable {
    let max_links = publics
        .iter()
        .map(|p| p.widget.links().len())
        .max()
        .unwrap_or(0);

    let mut columns = Vec::new();
    for field in fields {
        if field == "pos_links" {
            for i in 1..=max_links {
                columns.push(format!("pos_url-{i}"));
                columns.push(format!("pos_url_status-{i}"));
                columns.push(format!("url_utm_codes-{i}"));
            }
        } else {
            columns.push(field.clone());
        }
    }

    let mut rows = Vec::new();
    for public in publics {
        if skip_correct && public.widget.result() == WidgetResult::Correct {
            continue;
        }

        let mut row = Vec::with_capacity(columns.len());
        for field in fields {
            match field.as_str() {
                "url" => row.push(public.url().to_string()),
                "pos_result" => row.push(result_text(public.widget.result(), display)),
                "pos_links" => {
                    let links = public.widget.links();
                    for i in 0..max_links {
                        match links.get(i) {
                            Some(link) => {
                                row.push(link.url.clone());
                                row.push(status_text(link.status, display));
                                row.push(render_params(link, display));
                            }
                            None => row.extend([String::new(), String::new(), String::new()]),
                        }
                    }
                }
                other => row.push(public.field_data(other)),
            }
        }
        rows.push(row);
    }

    ResultTable { columns, rows }
}

/// Render the table in the requested format and write it out.
pub fn write_results(
    table: &ResultTable,
    format: ExportFormat,
    out_path: &str,
    delimiter: char,
) -> Result<()> {
    let text = match format {
        ExportFormat::Csv => render_csv(table, delimiter),
        ExportFormat::Json => render_json(table)?,
        ExportFormat::Md => render_md(table),
    };
    std::fs::write(out_path, text)
        .with_context(|| format!("failed to write result file {out_path}"))
}

/// Dump each community's raw payload as pretty JSON into `dir`.
pub fn save_payloads(publics: &[Public], dir: &str) -> Result<usize> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create payload directory {dir}"))?;

    let mut written = 0;
    for public in publics {
        let Some(data) = public.data() else { continue };
        let name = public.identify();
        if name.is_empty() {
            bail!("cannot derive a file name from {}", public.url());
        }
        let path = Path::new(dir).join(format!("{name}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(data)?)
            .with_context(|| format!("failed to write payload {}", path.display()))?;
        written += 1;
    }
    Ok(written)
}

pub fn render_csv(table: &ResultTable, delimiter: char) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, &table.columns, delimiter);
    for row in &table.rows {
        push_csv_row(&mut out, row, delimiter);
    }
    out
}

fn push_csv_row(out: &mut String, row: &[String], delimiter: char) {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(&csv_escape(field, delimiter));
    }
    out.push('\n');
}

fn csv_escape(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn render_json(table: &ResultTable) -> Result<String> {
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let obj: serde_json::Map<String, serde_json::Value> = table
                .columns
                .iter()
                .zip(row)
                .map(|(c, v)| (c.clone(), serde_json::Value::String(v.clone())))
                .collect();
            serde_json::Value::Object(obj)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

pub fn render_md(table: &ResultTable) -> String {
    let mut out = String::new();
    push_md_row(&mut out, &table.columns);
    out.push_str(&format!("|{}\n", " --- |".repeat(table.columns.len())));
    for row in &table.rows {
        push_md_row(&mut out, row);
    }
    out
}

fn push_md_row(out: &mut String, row: &[String]) {
    out.push('|');
    for field in row {
        out.push(' ');
        out.push_str(&field.replace('|', "\\|").replace('\n', "<br>"));
        out.push_str(" |");
    }
    out.push('\n');
}
