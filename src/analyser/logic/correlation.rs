//! Pearson correlation between numeric columns.
//!
//! Each pair is computed over the rows where both columns are present.
//! Pairs that are undefined (too few rows, a column without spread) are
//! skipped, never reported as zero.

use super::profiling::has_spread;
use super::table::Table;
use super::types::{CorrelationPair, CorrelationStrength};
use crate::error::Result;

/// Pearson coefficient of two equally long samples, clamped into [-1, 1].
/// `None` with fewer than two observations or when either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let xs = xs.get(..n)?;
    let ys = ys.get(..n)?;
    if !has_spread(xs) || !has_spread(ys) {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    let r = cov / (var_x * var_y).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Rows where both sides are present.
pub fn pairwise_complete(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

/// Every numeric column pair with |r| at or above `threshold`, strongest
/// first, ties by column names.
///
/// # Errors
///
/// Returns [`crate::error::AnalysisError::InternalInconsistency`] if a
/// numeric column holds a non-numeric value.
pub fn find_correlations(table: &Table, threshold: f64) -> Result<Vec<CorrelationPair>> {
    let numeric = table
        .numeric_columns()
        .map(|c| Ok((c.name.as_str(), c.numeric_values()?)))
        .collect::<Result<Vec<_>>>()?;

    let mut pairs = Vec::new();
    for (i, (name_a, values_a)) in numeric.iter().enumerate() {
        for (name_b, values_b) in numeric.iter().skip(i + 1) {
            let (xs, ys) = pairwise_complete(values_a, values_b);
            let Some(r) = pearson(&xs, &ys) else {
                tracing::trace!("Skipping undefined correlation {name_a} ~ {name_b}");
                continue;
            };
            if r.abs() >= threshold {
                pairs.push(CorrelationPair {
                    column_a: (*name_a).to_owned(),
                    column_b: (*name_b).to_owned(),
                    coefficient: r,
                    observations: xs.len(),
                    strength: CorrelationStrength::from_coefficient(r),
                });
            }
        }
    }

    pairs.sort_by(|p, q| {
        q.coefficient
            .abs()
            .total_cmp(&p.coefficient.abs())
            .then_with(|| p.column_a.cmp(&q.column_a))
            .then_with(|| p.column_b.cmp(&q.column_b))
    });
    Ok(pairs)
}
