//! Type inference and cleaning.
//!
//! Turns raw extractor cells into typed columns. Every column gets exactly
//! one committed [`ColumnKind`] before any statistic is computed:
//!
//! 1. Cells matching a null marker are missing.
//! 2. A column whose present cells are all boolean words (`y`/`n`
//!    included) is boolean. Otherwise each remaining cell votes for the
//!    first kind it parses as, in the order numeric, datetime, boolean,
//!    otherwise text; lone `y`/`n` vote as text.
//! 3. The most voted kind wins (ties go to the earlier kind) provided its
//!    share of present cells reaches `min_type_fraction`; text winners and
//!    weak winners make the column categorical. No present cells at all makes
//!    it unknown.
//! 4. Cells that fail to parse under the winning kind become missing and are
//!    reported back as [`CoercedCells`].

use super::table::{CellValue, Column, RawColumn, RawTable, Table};
use super::types::ColumnKind;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

// Day-first before month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y", "%d-%m-%Y",
];

const TRUE_WORDS: &[&str] = &["true", "yes"];
const FALSE_WORDS: &[&str] = &["false", "no"];
// Only count as booleans when a whole column is made of boolean words.
const SHORT_TRUE: &str = "y";
const SHORT_FALSE: &str = "n";

/// Number of raw samples kept per coerced column for messages.
const COERCED_SAMPLES: usize = 3;

/// Cells of one column that did not parse under the column's inferred kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercedCells {
    pub column: String,
    pub kind: ColumnKind,
    pub rows: Vec<usize>,
    pub samples: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub table: Table,
    /// Only columns with at least one coerced cell, in column order.
    pub coerced: Vec<CoercedCells>,
}

/// Parses individual cells. Holds the null markers and the compiled number
/// pattern; immutable once built.
#[derive(Debug, Clone)]
pub struct CellParser {
    null_markers: HashSet<String>,
    number: Regex,
}

impl CellParser {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InternalInconsistency`] if the built-in number
    /// pattern fails to compile.
    pub fn new(null_markers: &[String]) -> Result<Self> {
        let number = Regex::new(
            r"^(?P<sign>[+-])?\s*[$€£¥]?\s*(?P<int>[0-9]{1,3}(?:,[0-9]{3})+|[0-9]*)(?P<frac>\.[0-9]*)?(?P<exp>[eE][+-]?[0-9]+)?\s*[$€£¥]?\s*%?$",
        )
        .map_err(|e| AnalysisError::inconsistency(format!("number pattern: {e}")))?;

        Ok(Self {
            null_markers: null_markers.iter().map(|m| m.trim().to_owned()).collect(),
            number,
        })
    }

    pub fn is_missing(&self, text: &str) -> bool {
        self.null_markers.contains(text.trim())
    }

    /// Reads a number written the way extracted documents write them:
    /// `1,234.50`, `$12`, `-3.5%`, `(42)` for -42.
    pub fn parse_number(&self, text: &str) -> Option<f64> {
        let trimmed = text.trim();
        let (negated, body) = match trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => (false, trimmed),
        };

        let caps = self.number.captures(body)?;
        let int = caps.name("int").map_or("", |m| m.as_str());
        let frac = caps.name("frac").map_or("", |m| m.as_str());
        if !int.bytes().chain(frac.bytes()).any(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut normalized = String::with_capacity(body.len());
        if let Some(sign) = caps.name("sign") {
            normalized.push_str(sign.as_str());
        }
        normalized.extend(int.chars().filter(|c| *c != ','));
        if int.is_empty() {
            normalized.push('0');
        }
        normalized.push_str(frac.trim_end_matches('.'));
        if let Some(exp) = caps.name("exp") {
            normalized.push_str(exp.as_str());
        }

        let value: f64 = normalized.parse().ok()?;
        let value = if negated { -value } else { value };
        value.is_finite().then_some(value)
    }

    /// First kind the text parses as. Never returns unknown. Single letters
    /// `y`/`n` classify as text.
    pub fn classify(&self, text: &str) -> ColumnKind {
        if self.parse_number(text).is_some() {
            ColumnKind::Numeric
        } else if parse_datetime(text).is_some() {
            ColumnKind::DateTime
        } else if boolean_word(&text.trim().to_lowercase(), false).is_some() {
            ColumnKind::Boolean
        } else {
            ColumnKind::Categorical
        }
    }

    /// Converts text under a committed kind. `None` means the cell does not
    /// fit the kind.
    pub fn convert(&self, text: &str, kind: ColumnKind) -> Option<CellValue> {
        match kind {
            ColumnKind::Numeric => self.parse_number(text).map(CellValue::Number),
            ColumnKind::DateTime => parse_datetime(text).map(CellValue::DateTime),
            ColumnKind::Boolean => parse_boolean(text).map(CellValue::Boolean),
            ColumnKind::Categorical => Some(CellValue::Text(text.trim().to_owned())),
            ColumnKind::Unknown => None,
        }
    }
}

pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn boolean_word(lower: &str, allow_short: bool) -> Option<bool> {
    if TRUE_WORDS.contains(&lower) || (allow_short && lower == SHORT_TRUE) {
        Some(true)
    } else if FALSE_WORDS.contains(&lower) || (allow_short && lower == SHORT_FALSE) {
        Some(false)
    } else {
        None
    }
}

/// Word booleans including `y`/`n`, plus `1`/`0` once a column is already
/// committed to boolean.
pub fn parse_boolean(text: &str) -> Option<bool> {
    let lower = text.trim().to_lowercase();
    boolean_word(&lower, true).or(match lower.as_str() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    })
}

fn is_boolean_word(text: &str) -> bool {
    boolean_word(&text.trim().to_lowercase(), true).is_some()
}

/// Votes a kind for the present (non-missing) cells of a column.
pub fn infer_kind(parser: &CellParser, present: &[&str], min_type_fraction: f64) -> ColumnKind {
    if present.is_empty() {
        return ColumnKind::Unknown;
    }
    // y/n columns: every present value is a boolean word
    if present.iter().all(|t| is_boolean_word(t)) {
        return ColumnKind::Boolean;
    }

    // numeric, datetime, boolean, text
    let mut votes = [0usize; 4];
    for text in present {
        let slot = match parser.classify(text) {
            ColumnKind::Numeric => 0,
            ColumnKind::DateTime => 1,
            ColumnKind::Boolean => 2,
            ColumnKind::Categorical | ColumnKind::Unknown => 3,
        };
        if let Some(v) = votes.get_mut(slot) {
            *v += 1;
        }
    }

    let mut winner = 0;
    let mut best = 0;
    for (slot, &count) in votes.iter().enumerate() {
        if count > best {
            best = count;
            winner = slot;
        }
    }

    let kind = match winner {
        0 => ColumnKind::Numeric,
        1 => ColumnKind::DateTime,
        2 => ColumnKind::Boolean,
        _ => return ColumnKind::Categorical,
    };

    let share = best as f64 / present.len() as f64;
    if share >= min_type_fraction {
        kind
    } else {
        ColumnKind::Categorical
    }
}

fn clean_column(
    parser: &CellParser,
    raw: &RawColumn,
    min_type_fraction: f64,
) -> (Column, Option<CoercedCells>) {
    let texts: Vec<Option<Cow<'_, str>>> = raw
        .cells
        .iter()
        .map(|cell| {
            cell.as_ref()
                .map(|v| v.as_text())
                .filter(|t| !parser.is_missing(t))
        })
        .collect();

    let present: Vec<&str> = texts.iter().flatten().map(AsRef::<str>::as_ref).collect();
    let kind = infer_kind(parser, &present, min_type_fraction);

    let mut rows = Vec::new();
    let mut samples = Vec::new();
    let values = texts
        .iter()
        .enumerate()
        .map(|(row, text)| {
            let Some(text) = text else {
                return CellValue::Missing;
            };
            parser.convert(text, kind).unwrap_or_else(|| {
                rows.push(row);
                if samples.len() < COERCED_SAMPLES {
                    samples.push(text.trim().to_owned());
                }
                CellValue::Missing
            })
        })
        .collect();

    let coerced = (!rows.is_empty()).then(|| CoercedCells {
        column: raw.name.clone(),
        kind,
        rows,
        samples,
    });

    (Column::new(raw.name.clone(), kind, values), coerced)
}

/// Infers a kind for every column and converts its cells.
///
/// # Errors
///
/// Returns [`AnalysisError::InputValidation`] if the raw table breaks a
/// structural invariant.
pub fn clean_table(
    raw: &RawTable,
    parser: &CellParser,
    config: &AnalysisConfig,
) -> Result<CleaningOutcome> {
    raw.validate()?;

    let mut columns = Vec::with_capacity(raw.column_count());
    let mut coerced = Vec::new();
    for raw_column in &raw.columns {
        let (column, dropped) = clean_column(parser, raw_column, config.min_type_fraction);
        tracing::debug!(
            column = %column.name,
            kind = %column.kind,
            coerced = dropped.as_ref().map_or(0, |d| d.rows.len()),
            "Inferred column type"
        );
        columns.push(column);
        coerced.extend(dropped);
    }

    Ok(CleaningOutcome {
        table: Table::new(columns)?,
        coerced,
    })
}
