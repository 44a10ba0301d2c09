//! Descriptive statistics for typed columns.
//!
//! Numeric columns get location, spread and shape statistics computed over
//! their present values only. Every other kind gets frequency statistics
//! (distinct count and mode), and datetime columns additionally report their
//! earliest and latest values.
//!
//! Statistics that the data cannot support (no values, too few values, zero
//! variance) are `None`; they are never reported as zero and never fail the
//! analysis.

use super::table::{CellValue, Column, Table};
use super::types::{ColumnKind, ColumnStats, FrequencyStats, NumericStats, TemporalStats};
use crate::error::{AnalysisError, Result};
use chrono::NaiveDateTime;
use indexmap::IndexMap;

/// Linear interpolation between order statistics at position `p * (n - 1)`.
/// `sorted` must be ascending.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = p.clamp(0.0, 1.0) * last as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let lo = *sorted.get(lower)?;
    let hi = *sorted.get(upper)?;
    Some(lo + (hi - lo) * (pos - lower as f64))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample (n - 1) standard deviation.
pub fn sample_std_dev(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Central moments m2, m3, m4 (population form).
fn central_moments(values: &[f64], mean: f64) -> (f64, f64, f64) {
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Adjusted Fisher–Pearson skewness. Needs three values and some spread.
pub fn calculate_skew(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 3 || !has_spread(values) {
        return None;
    }
    let (m2, m3, _) = central_moments(values, mean);
    if m2 <= 0.0 {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    let n = n as f64;
    Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Bias-corrected excess kurtosis. Needs four values and some spread.
pub fn calculate_kurtosis(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 4 || !has_spread(values) {
        return None;
    }
    let (m2, _, m4) = central_moments(values, mean);
    if m2 <= 0.0 {
        return None;
    }
    let g2 = m4 / (m2 * m2) - 3.0;
    let n = n as f64;
    Some(((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

// Exact comparison: rounding in the mean must not turn a constant column
// into a skewed one.
pub fn has_spread(values: &[f64]) -> bool {
    values
        .split_first()
        .is_some_and(|(first, rest)| rest.iter().any(|v| v != first))
}

/// # Errors
///
/// Returns [`AnalysisError::InternalInconsistency`] if the column is not
/// numeric or holds a non-numeric value.
pub fn analyse_numeric(column: &Column) -> Result<NumericStats> {
    let mut values: Vec<f64> = column.numeric_values()?.into_iter().flatten().collect();
    let missing = column.len() - values.len();
    if values.is_empty() {
        return Ok(NumericStats {
            missing,
            ..Default::default()
        });
    }

    let mean_value = mean(&values);
    let (std_dev, skewness, kurtosis) = match mean_value {
        Some(m) => (
            sample_std_dev(&values, m),
            calculate_skew(&values, m),
            calculate_kurtosis(&values, m),
        ),
        None => (None, None, None),
    };

    values.sort_by(f64::total_cmp);
    Ok(NumericStats {
        count: values.len(),
        missing,
        mean: mean_value,
        median: quantile(&values, 0.5),
        std_dev,
        min: values.first().copied(),
        max: values.last().copied(),
        q1: quantile(&values, 0.25),
        q3: quantile(&values, 0.75),
        skewness,
        kurtosis,
    })
}

/// Distinct count and mode over the display form of present values. Mode
/// ties go to the value seen first.
pub fn analyse_frequency(column: &Column) -> FrequencyStats {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in column.values.iter().filter(|v| !v.is_missing()) {
        *counts.entry(value.to_string()).or_default() += 1;
    }

    let mut mode: Option<(&String, usize)> = None;
    for (value, &count) in &counts {
        if mode.is_none_or(|(_, best)| count > best) {
            mode = Some((value, count));
        }
    }

    FrequencyStats {
        count: column.present_count(),
        missing: column.missing_count(),
        distinct: counts.len(),
        mode: mode.map(|(value, _)| value.clone()),
        mode_frequency: mode.map_or(0, |(_, count)| count),
    }
}

/// # Errors
///
/// Returns [`AnalysisError::InternalInconsistency`] if a present value is
/// not a datetime.
pub fn analyse_temporal(column: &Column) -> Result<TemporalStats> {
    let mut earliest: Option<NaiveDateTime> = None;
    let mut latest: Option<NaiveDateTime> = None;
    for value in column.values.iter().filter(|v| !v.is_missing()) {
        let dt = value.as_datetime().ok_or_else(|| {
            AnalysisError::inconsistency(format!(
                "column '{}' is datetime but holds '{value}'",
                column.name
            ))
        })?;
        if earliest.is_none_or(|e| dt < e) {
            earliest = Some(dt);
        }
        if latest.is_none_or(|l| dt > l) {
            latest = Some(dt);
        }
    }

    let fmt = |dt: NaiveDateTime| CellValue::DateTime(dt).to_string();
    Ok(TemporalStats {
        frequency: analyse_frequency(column),
        earliest: earliest.map(fmt),
        latest: latest.map(fmt),
    })
}

/// # Errors
///
/// Fails only when a column's values contradict its kind.
pub fn describe_column(column: &Column) -> Result<ColumnStats> {
    Ok(match column.kind {
        ColumnKind::Numeric => ColumnStats::Numeric(analyse_numeric(column)?),
        ColumnKind::DateTime => ColumnStats::Temporal(analyse_temporal(column)?),
        ColumnKind::Categorical | ColumnKind::Boolean | ColumnKind::Unknown => {
            ColumnStats::Frequency(analyse_frequency(column))
        }
    })
}

/// Statistics for every column, keyed by name in column order.
///
/// # Errors
///
/// See [`describe_column`].
pub fn describe_table(table: &Table) -> Result<IndexMap<String, ColumnStats>> {
    table
        .columns
        .iter()
        .map(|column| Ok((column.name.clone(), describe_column(column)?)))
        .collect()
}
