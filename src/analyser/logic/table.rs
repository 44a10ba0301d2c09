//! Table model: the raw table handed in by the extractor and the typed table
//! produced by type inference.

use super::types::ColumnKind;
use crate::error::{AnalysisError, Result};
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

// RAW INPUT

/// A raw cell value as produced by table extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Text form used for parsing. Numbers use Rust's shortest round-trip
    /// formatting, so `Number(10.0)` reads back as `"10"`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub cells: Vec<Option<RawValue>>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, cells: Vec<Option<RawValue>>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Column where every cell is present text.
    pub fn from_texts<I, S>(name: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            cells
                .into_iter()
                .map(|s| Some(RawValue::Text(s.into())))
                .collect(),
        )
    }

    /// Column of text cells where `None` marks an absent cell.
    pub fn from_optional_texts<I>(name: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = Option<&'static str>>,
    {
        Self::new(
            name,
            cells
                .into_iter()
                .map(|c| c.map(RawValue::from))
                .collect(),
        )
    }

    pub fn from_numbers<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(
            name,
            values.into_iter().map(|v| Some(RawValue::Number(v))).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The table as received from the extraction collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self { columns }
    }

    #[must_use]
    pub fn with_column(mut self, column: RawColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Builds a column-major table from a header and row-major cells, which
    /// may be text or already typed raw values.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InputValidation`] when a row's width differs
    /// from the header's.
    pub fn from_rows<C>(headers: Vec<String>, rows: Vec<Vec<Option<C>>>) -> Result<Self>
    where
        C: Into<RawValue>,
    {
        let width = headers.len();
        let mut columns: Vec<RawColumn> = headers
            .into_iter()
            .map(|name| RawColumn::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(AnalysisError::input(format!(
                    "row {row_idx} has {} cells, expected {width}",
                    row.len()
                )));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.cells.push(cell.map(Into::into));
            }
        }

        Ok(Self { columns })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, RawColumn::len)
    }

    /// Checks the structural invariants and returns the row count.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InputValidation`] for zero columns, zero rows,
    /// ragged columns, or blank/duplicate column names.
    pub fn validate(&self) -> Result<usize> {
        let Some(first) = self.columns.first() else {
            return Err(AnalysisError::input("table has no columns"));
        };
        let rows = first.len();
        if rows == 0 {
            return Err(AnalysisError::input("table has no rows"));
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(AnalysisError::input("column name must not be blank"));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(AnalysisError::input(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            if column.len() != rows {
                return Err(AnalysisError::input(format!(
                    "column '{}' has {} cells, expected {rows}",
                    column.name,
                    column.len()
                )));
            }
        }
        Ok(rows)
    }
}

// TYPED TABLE

/// A cleaned cell: a typed value or an explicit missing marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Missing,
    Number(f64),
    DateTime(NaiveDateTime),
    Boolean(bool),
    Text(String),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(v) => write!(f, "{v}"),
            Self::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S"))
                }
            }
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    pub fn present_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Numeric view of the column, `None` for missing cells.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InternalInconsistency`] if the column is not
    /// numeric or holds a non-numeric value.
    pub fn numeric_values(&self) -> Result<Vec<Option<f64>>> {
        if self.kind != ColumnKind::Numeric {
            return Err(AnalysisError::inconsistency(format!(
                "column '{}' is {}, not numeric",
                self.name, self.kind
            )));
        }
        self.values
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                CellValue::Number(v) => Ok(Some(*v)),
                CellValue::Missing => Ok(None),
                other => Err(AnalysisError::inconsistency(format!(
                    "numeric column '{}' holds non-numeric value '{other}' at row {row}",
                    self.name
                ))),
            })
            .collect()
    }

    /// Present numeric values with their row index, in row order.
    ///
    /// # Errors
    ///
    /// Same as [`Column::numeric_values`].
    pub fn indexed_numbers(&self) -> Result<Vec<(usize, f64)>> {
        Ok(self
            .numeric_values()?
            .into_iter()
            .enumerate()
            .filter_map(|(row, v)| v.map(|v| (row, v)))
            .collect())
    }
}

/// The cleaned table: every column typed, every column the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub row_count: usize,
    pub columns: Vec<Column>,
}

impl Table {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InputValidation`] if columns are missing,
    /// empty or of differing lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(AnalysisError::input("table has no columns"));
        };
        let row_count = first.len();
        if row_count == 0 {
            return Err(AnalysisError::input("table has no rows"));
        }
        if let Some(ragged) = columns.iter().find(|c| c.len() != row_count) {
            return Err(AnalysisError::input(format!(
                "column '{}' has {} cells, expected {row_count}",
                ragged.name,
                ragged.len()
            )));
        }
        Ok(Self { row_count, columns })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::Numeric)
    }

    pub fn missing_cells(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }
}
