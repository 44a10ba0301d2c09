//! Trend detection over row order.
//!
//! Each numeric column is treated as a series indexed by row. A least-squares
//! line is fitted through its present values; the fitted change across the
//! observed rows, relative to the column's value range, decides whether the
//! column moves at all. The fit's R² grades how much to trust the direction.

use super::table::Table;
use super::types::{TrendConfidence, TrendDirection, TrendRecord};
use crate::config::AnalysisConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Ordinary least squares of `y` on `x`. `None` with fewer than two points or
/// when every `x` is the same.
pub fn fit_line(points: &[(f64, f64)]) -> Option<LinearFit> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let n = n as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let r_squared = if syy > 0.0 {
        ((sxy * sxy) / (sxx * syy)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r_squared,
    })
}

/// Means of the values before and from row `split`.
fn half_means(indexed: &[(usize, f64)], split: usize) -> (Option<f64>, Option<f64>) {
    let mean_of = |values: Vec<f64>| {
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    };
    let (first, second): (Vec<(usize, f64)>, Vec<(usize, f64)>) =
        indexed.iter().partition(|(row, _)| *row < split);
    (
        mean_of(first.into_iter().map(|(_, v)| v).collect()),
        mean_of(second.into_iter().map(|(_, v)| v).collect()),
    )
}

/// Percentage change from `first` to `second`, relative to the size of
/// `first`. `None` when `first` is zero.
pub fn percent_change(first: f64, second: f64) -> Option<f64> {
    (first != 0.0).then(|| (second - first) / first.abs() * 100.0)
}

/// One record per numeric column with enough points and a non-zero range,
/// in column order.
///
/// # Errors
///
/// Returns [`crate::error::AnalysisError::InternalInconsistency`] if a
/// numeric column holds a non-numeric value.
pub fn detect_trends(table: &Table, config: &AnalysisConfig) -> Result<Vec<TrendRecord>> {
    let split = table.row_count / 2;
    let mut trends = Vec::new();

    for column in table.numeric_columns() {
        let indexed = column.indexed_numbers()?;
        if indexed.len() < config.min_trend_points {
            continue;
        }

        let (min, max) = indexed
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
                (lo.min(*v), hi.max(*v))
            });
        let range = max - min;
        if range <= 0.0 {
            continue;
        }

        let points: Vec<(f64, f64)> = indexed.iter().map(|&(row, v)| (row as f64, v)).collect();
        let Some(fit) = fit_line(&points) else {
            continue;
        };

        let span = match (indexed.first(), indexed.last()) {
            (Some((first, _)), Some((last, _))) => (last - first) as f64,
            _ => 0.0,
        };
        let relative_change = fit.slope.abs() * span / range;
        let direction = if relative_change < config.trend_slope_threshold {
            TrendDirection::Flat
        } else if fit.slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        let (first_half_mean, second_half_mean) = half_means(&indexed, split);
        let change_pct = match (first_half_mean, second_half_mean) {
            (Some(a), Some(b)) => percent_change(a, b),
            _ => None,
        };

        tracing::debug!(
            column = %column.name,
            direction = direction.as_str(),
            slope = fit.slope,
            r_squared = fit.r_squared,
            "Fitted trend"
        );

        trends.push(TrendRecord {
            column: column.name.clone(),
            direction,
            slope: fit.slope,
            relative_change,
            r_squared: fit.r_squared,
            confidence: TrendConfidence::from_r_squared(fit.r_squared),
            points: indexed.len(),
            first_half_mean,
            second_half_mean,
            change_pct,
        });
    }
    Ok(trends)
}
