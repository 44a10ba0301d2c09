//! Rule-based insight synthesis.
//!
//! Each rule reads the already computed analysis outputs and contributes
//! plain-language sentences. Rules never fail; a rule with nothing to say
//! contributes nothing. Output always follows the declaration order of
//! [`InsightRule`], whatever order the configuration lists them in.

use super::types::{
    ColumnStats, CorrelationPair, FindingKind, OutlierRecord, QualityFinding, Severity,
    TrendDirection, TrendRecord,
};
use crate::config::{AnalysisConfig, InsightRule};
use indexmap::IndexMap;

/// Borrowed view of everything the rules may look at.
#[derive(Debug, Clone, Copy)]
pub struct InsightInputs<'a> {
    pub row_count: usize,
    pub column_count: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub column_stats: &'a IndexMap<String, ColumnStats>,
    pub findings: &'a [QualityFinding],
    pub correlations: &'a [CorrelationPair],
    pub outliers: &'a [OutlierRecord],
    pub trends: &'a [TrendRecord],
}

pub fn generate_insights(inputs: &InsightInputs<'_>, config: &AnalysisConfig) -> Vec<String> {
    let mut insights = Vec::new();
    for rule in InsightRule::ALL {
        if !config.rule_enabled(rule) {
            continue;
        }
        let before = insights.len();
        match rule {
            InsightRule::OverallMissing => overall_missing(inputs, config, &mut insights),
            InsightRule::ColumnMissing => column_missing(inputs, &mut insights),
            InsightRule::InconsistentTypes => inconsistent_types(inputs, &mut insights),
            InsightRule::Duplicates => duplicates(inputs, &mut insights),
            InsightRule::ConstantColumns => constant_columns(inputs, &mut insights),
            InsightRule::Correlations => correlations(inputs, &mut insights),
            InsightRule::Outliers => outliers(inputs, config, &mut insights),
            InsightRule::Skewness => skewness(inputs, config, &mut insights),
            InsightRule::Trends => trends(inputs, &mut insights),
        }
        tracing::trace!(rule = rule.as_str(), added = insights.len() - before, "Insight rule");
    }
    insights
}

fn overall_missing(inputs: &InsightInputs<'_>, config: &AnalysisConfig, out: &mut Vec<String>) {
    let cells = inputs.row_count * inputs.column_count;
    if cells == 0 {
        return;
    }
    let share = inputs.missing_cells as f64 / cells as f64;
    if share > config.overall_missing_insight_threshold {
        out.push(format!(
            "{:.1}% of all cells are missing; consider imputing or cleaning the data before drawing conclusions.",
            share * 100.0
        ));
    }
}

fn column_missing(inputs: &InsightInputs<'_>, out: &mut Vec<String>) {
    for finding in inputs.findings.iter().filter(|f| {
        f.kind == FindingKind::MissingValues && f.severity == Severity::Warning
    }) {
        let share = if inputs.row_count > 0 {
            finding.rows.len() as f64 / inputs.row_count as f64 * 100.0
        } else {
            0.0
        };
        for column in &finding.columns {
            out.push(format!(
                "Column '{column}' is missing {share:.1}% of its values; review how this field is collected."
            ));
        }
    }
}

fn inconsistent_types(inputs: &InsightInputs<'_>, out: &mut Vec<String>) {
    for finding in inputs
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::InconsistentType)
    {
        for column in &finding.columns {
            out.push(format!(
                "Column '{column}' has {} value(s) that do not match its inferred type; check how this field was extracted.",
                finding.rows.len()
            ));
        }
    }
}

fn duplicates(inputs: &InsightInputs<'_>, out: &mut Vec<String>) {
    if inputs.duplicate_rows > 0 {
        out.push(format!(
            "{} duplicate row(s) found; consider removing them before analysis.",
            inputs.duplicate_rows
        ));
    }
}

fn constant_columns(inputs: &InsightInputs<'_>, out: &mut Vec<String>) {
    for finding in inputs
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::ConstantColumn)
    {
        for column in &finding.columns {
            out.push(format!(
                "Column '{column}' holds a single value and adds little analytical value."
            ));
        }
    }
}

fn correlations(inputs: &InsightInputs<'_>, out: &mut Vec<String>) {
    for pair in inputs.correlations {
        let sign = if pair.coefficient >= 0.0 {
            "positive"
        } else {
            "negative"
        };
        out.push(format!(
            "'{}' and '{}' have a {} {sign} correlation (r = {:.2}).",
            pair.column_a,
            pair.column_b,
            pair.strength.as_str(),
            pair.coefficient
        ));
    }
}

fn outliers(inputs: &InsightInputs<'_>, config: &AnalysisConfig, out: &mut Vec<String>) {
    // Records arrive grouped by column.
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for record in inputs.outliers {
        *counts.entry(record.column.as_str()).or_default() += 1;
    }
    for (column, count) in counts {
        if count >= config.outlier_insight_min_count {
            out.push(format!(
                "Column '{column}' has {count} outlier(s); check them for data-entry errors."
            ));
        }
    }
}

fn skewness(inputs: &InsightInputs<'_>, config: &AnalysisConfig, out: &mut Vec<String>) {
    for (column, stats) in inputs.column_stats {
        let Some(skew) = stats.as_numeric().and_then(|s| s.skewness) else {
            continue;
        };
        if skew.abs() > config.skew_insight_threshold {
            let side = if skew > 0.0 { "right" } else { "left" };
            out.push(format!(
                "Column '{column}' is strongly {side}-skewed (skewness {skew:.2}); a log transformation may help."
            ));
        }
    }
}

fn trends(inputs: &InsightInputs<'_>, out: &mut Vec<String>) {
    for trend in inputs
        .trends
        .iter()
        .filter(|t| t.direction != TrendDirection::Flat)
    {
        let mut sentence = format!(
            "Column '{}' is {} across rows ({} confidence, R² = {:.2})",
            trend.column,
            trend.direction.as_str(),
            trend.confidence.as_str(),
            trend.r_squared
        );
        if let Some(pct) = trend.change_pct {
            let word = if pct >= 0.0 { "higher" } else { "lower" };
            sentence.push_str(&format!(
                "; the second half averages {:.1}% {word} than the first",
                pct.abs()
            ));
        }
        sentence.push('.');
        out.push(sentence);
    }
}
