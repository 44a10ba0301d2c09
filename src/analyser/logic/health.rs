//! Data quality checks and the health score.
//!
//! Findings cover missing values, type coercions, duplicate rows and
//! constant columns. The score starts at 1 and loses a fixed penalty per
//! warning and per info finding, floored at 0.

use super::cleaning::CoercedCells;
use super::table::{CellValue, Column, Table};
use super::types::{FindingKind, QualityFinding, Severity};
use crate::config::{AnalysisConfig, DuplicateMode};
use indexmap::IndexMap;
use std::collections::HashSet;

pub const WARNING_PENALTY: f64 = 0.10;
pub const INFO_PENALTY: f64 = 0.05;

/// Rows listed by value in duplicate messages.
const MESSAGE_ROWS: usize = 5;

const FIELD_SEPARATOR: char = '\x1F';
const MISSING_KEY: &str = "\x00NULL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub first_row: usize,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub findings: Vec<QualityFinding>,
    /// Rows beyond the first of each duplicate group.
    pub duplicate_rows: usize,
}

fn push_cell_key(key: &mut String, cell: &CellValue, mode: DuplicateMode) {
    match cell {
        CellValue::Missing => key.push_str(MISSING_KEY),
        CellValue::Number(v) => {
            // -0.0 and 0.0 compare equal
            let v = if *v == 0.0 { 0.0 } else { *v };
            key.push('n');
            key.push_str(&v.to_bits().to_string());
        }
        CellValue::DateTime(dt) => {
            key.push('d');
            key.push_str(&dt.and_utc().timestamp_micros().to_string());
        }
        CellValue::Boolean(b) => key.push_str(if *b { "btrue" } else { "bfalse" }),
        CellValue::Text(s) => {
            key.push('t');
            match mode {
                DuplicateMode::Exact => key.push_str(s),
                DuplicateMode::Normalized => key.push_str(&s.trim().to_lowercase()),
            }
        }
    }
}

fn row_key(table: &Table, row: usize, mode: DuplicateMode) -> String {
    let mut key = String::new();
    for (i, column) in table.columns.iter().enumerate() {
        if i > 0 {
            key.push(FIELD_SEPARATOR);
        }
        if let Some(cell) = column.values.get(row) {
            push_cell_key(&mut key, cell, mode);
        }
    }
    key
}

/// Groups of identical rows (missing equals missing), ordered by first row.
/// Rows that appear once are not returned.
pub fn find_duplicate_groups(table: &Table, mode: DuplicateMode) -> Vec<DuplicateGroup> {
    let mut groups: IndexMap<String, DuplicateGroup> = IndexMap::new();
    for row in 0..table.row_count {
        groups
            .entry(row_key(table, row, mode))
            .and_modify(|g| g.size += 1)
            .or_insert(DuplicateGroup {
                first_row: row,
                size: 1,
            });
    }
    groups.into_values().filter(|g| g.size > 1).collect()
}

fn distinct_present(column: &Column) -> HashSet<String> {
    column
        .values
        .iter()
        .filter(|v| !v.is_missing())
        .map(ToString::to_string)
        .collect()
}

fn inconsistent_finding(coerced: &CoercedCells) -> QualityFinding {
    let examples = coerced
        .samples
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ");
    QualityFinding {
        kind: FindingKind::InconsistentType,
        severity: Severity::Warning,
        columns: vec![coerced.column.clone()],
        rows: coerced.rows.clone(),
        group_sizes: Vec::new(),
        message: format!(
            "Column '{}' is {} but {} value(s) could not be parsed (e.g. {examples}); they are treated as missing",
            coerced.column,
            coerced.kind,
            coerced.rows.len()
        ),
    }
}

fn missing_finding(column: &Column, row_count: usize, threshold: f64) -> Option<QualityFinding> {
    let rows: Vec<usize> = column
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_missing())
        .map(|(row, _)| row)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let share = rows.len() as f64 / row_count as f64;
    let severity = if share >= threshold {
        Severity::Warning
    } else {
        Severity::Info
    };
    Some(QualityFinding {
        kind: FindingKind::MissingValues,
        severity,
        columns: vec![column.name.clone()],
        message: format!(
            "Column '{}' has {} missing value(s) ({:.1}%)",
            column.name,
            rows.len(),
            share * 100.0
        ),
        rows,
        group_sizes: Vec::new(),
    })
}

fn constant_finding(column: &Column) -> Option<QualityFinding> {
    let distinct = distinct_present(column);
    if distinct.len() != 1 {
        return None;
    }
    let value = distinct.into_iter().next().unwrap_or_default();
    Some(QualityFinding {
        kind: FindingKind::ConstantColumn,
        severity: Severity::Info,
        columns: vec![column.name.clone()],
        rows: Vec::new(),
        group_sizes: Vec::new(),
        message: format!(
            "Column '{}' has a single distinct value '{value}'",
            column.name
        ),
    })
}

fn duplicate_finding(groups: &[DuplicateGroup]) -> Option<QualityFinding> {
    if groups.is_empty() {
        return None;
    }
    let extra: usize = groups.iter().map(|g| g.size - 1).sum();
    let mut listed = groups
        .iter()
        .take(MESSAGE_ROWS)
        .map(|g| format!("row {} x{}", g.first_row, g.size))
        .collect::<Vec<_>>()
        .join(", ");
    if groups.len() > MESSAGE_ROWS {
        listed.push_str(", ...");
    }
    Some(QualityFinding {
        kind: FindingKind::DuplicateRows,
        severity: Severity::Warning,
        columns: Vec::new(),
        rows: groups.iter().map(|g| g.first_row).collect(),
        group_sizes: groups.iter().map(|g| g.size).collect(),
        message: format!(
            "{extra} duplicate row(s) in {} group(s): {listed}",
            groups.len()
        ),
    })
}

/// Runs every quality check. Findings come in column order (inconsistent
/// type, missing values, constant column per column), duplicates last.
pub fn assess_quality(
    table: &Table,
    coerced: &[CoercedCells],
    config: &AnalysisConfig,
) -> QualityReport {
    let mut findings = Vec::new();

    for column in &table.columns {
        if let Some(dropped) = coerced.iter().find(|c| c.column == column.name) {
            findings.push(inconsistent_finding(dropped));
        }
        findings.extend(missing_finding(
            column,
            table.row_count,
            config.missing_warning_threshold,
        ));
        findings.extend(constant_finding(column));
    }

    let groups = find_duplicate_groups(table, config.duplicate_mode);
    let duplicate_rows: usize = groups.iter().map(|g| g.size - 1).sum();
    findings.extend(duplicate_finding(&groups));

    tracing::debug!(
        findings = findings.len(),
        duplicate_rows,
        "Quality assessment complete"
    );

    QualityReport {
        findings,
        duplicate_rows,
    }
}

/// 1.0 for a clean table, minus a fixed penalty per finding, floored at 0.
pub fn calculate_health_score(findings: &[QualityFinding]) -> f64 {
    let penalty: f64 = findings
        .iter()
        .map(|f| match f.severity {
            Severity::Warning => WARNING_PENALTY,
            Severity::Info => INFO_PENALTY,
        })
        .sum();
    (1.0 - penalty).max(0.0)
}
