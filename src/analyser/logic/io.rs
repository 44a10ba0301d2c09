use super::table::{RawColumn, RawTable, RawValue};
use super::types::AnalysisResult;
use crate::error::{AnalysisError, Result, ResultExt as _};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTable {
    Columns {
        columns: Vec<RawColumn>,
    },
    Rows {
        headers: Vec<String>,
        rows: Vec<Vec<Option<RawValue>>>,
    },
}

/// Loads a raw table, picking the reader from the file extension
/// (`csv`, `tsv` or `json`).
///
/// # Errors
///
/// Fails on I/O errors, malformed content or an unsupported extension.
pub fn load_raw_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    let table = match ext.as_str() {
        "csv" | "tsv" => {
            let delimiter = if ext == "tsv" { b'\t' } else { b',' };
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_csv(file, delimiter)
                .with_context(|| format!("Failed to read CSV {}", path.display()))?
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_json_table(&text)
                .with_context(|| format!("Failed to parse JSON table {}", path.display()))?
        }
        _ => {
            return Err(AnalysisError::input(format!(
                "Unsupported file extension: '{ext}' (expected csv, tsv or json)"
            )));
        }
    };

    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "Loaded raw table"
    );
    Ok(table)
}

/// Reads delimited text with a header row. Every field is kept as text,
/// including empty ones; the engine's null markers decide what is missing.
///
/// # Errors
///
/// Fails on malformed CSV or rows whose width differs from the header.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(ToOwned::to_owned)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(|f| Some(f.to_owned())).collect());
    }
    RawTable::from_rows(headers, rows)
}

/// Accepts either `{"columns": [{"name": ..., "cells": [...]}]}` or
/// `{"headers": [...], "rows": [[...], ...]}`. Cells may be strings,
/// numbers, booleans or null.
///
/// # Errors
///
/// Fails on invalid JSON or ragged rows.
pub fn parse_json_table(text: &str) -> Result<RawTable> {
    match serde_json::from_str::<JsonTable>(text)? {
        JsonTable::Columns { columns } => Ok(RawTable::new(columns)),
        JsonTable::Rows { headers, rows } => RawTable::from_rows(headers, rows),
    }
}

/// Writes the result as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Fails on I/O or serialization errors.
pub fn save_result(result: &AnalysisResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, result.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Saved analysis result to {}", path.display());
    Ok(())
}
