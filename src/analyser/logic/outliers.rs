//! IQR outlier detection with Tukey fences.

use super::profiling::quantile;
use super::table::Table;
use super::types::OutlierRecord;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Fences {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Distance past the violated fence, in IQR units. Zero inside.
    pub fn deviation(&self, value: f64) -> f64 {
        let past = if value < self.lower {
            self.lower - value
        } else if value > self.upper {
            value - self.upper
        } else {
            0.0
        };
        past / self.iqr()
    }
}

/// Tukey fences `[Q1 - k*IQR, Q3 + k*IQR]`. `None` when there are no values
/// or the IQR is zero.
pub fn tukey_fences(values: &[f64], k: f64) -> Option<Fences> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    if iqr <= 0.0 {
        return None;
    }
    Some(Fences {
        q1,
        q3,
        lower: q1 - k * iqr,
        upper: q3 + k * iqr,
    })
}

/// Values strictly outside the fences of their column, ordered by column
/// then row.
///
/// # Errors
///
/// Returns [`crate::error::AnalysisError::InternalInconsistency`] if a
/// numeric column holds a non-numeric value.
pub fn detect_outliers(table: &Table, k: f64) -> Result<Vec<OutlierRecord>> {
    let mut outliers = Vec::new();
    for column in table.numeric_columns() {
        let indexed = column.indexed_numbers()?;
        let values: Vec<f64> = indexed.iter().map(|(_, v)| *v).collect();
        let Some(fences) = tukey_fences(&values, k) else {
            continue;
        };

        let before = outliers.len();
        outliers.extend(
            indexed
                .iter()
                .filter(|(_, v)| !fences.contains(*v))
                .map(|&(row, value)| OutlierRecord {
                    column: column.name.clone(),
                    row,
                    value,
                    lower_bound: fences.lower,
                    upper_bound: fences.upper,
                    deviation: fences.deviation(value),
                }),
        );
        tracing::debug!(
            column = %column.name,
            outliers = outliers.len() - before,
            "Checked Tukey fences"
        );
    }
    Ok(outliers)
}
