//! Engine configuration.
//!
//! [`AnalysisConfig`] is built once, validated once by
//! [`AnalysisConfig::validate`] (the engine calls it on construction) and
//! never mutated afterwards. Every field has a default, and partial JSON
//! files are accepted: missing keys fall back to [`AnalysisConfig::default`].

use crate::error::{AnalysisError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", "-", "--", "NaN", "nan",
    "#N/A",
];

/// How two rows are compared when looking for duplicates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMode {
    /// Typed values must match exactly.
    #[default]
    Exact,
    /// Text is compared trimmed and case-folded; other types exactly.
    Normalized,
}

/// Insight rules, declared in the order their output appears.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InsightRule {
    OverallMissing,
    ColumnMissing,
    InconsistentTypes,
    Duplicates,
    ConstantColumns,
    Correlations,
    Outliers,
    Skewness,
    Trends,
}

impl InsightRule {
    pub const ALL: [Self; 9] = [
        Self::OverallMissing,
        Self::ColumnMissing,
        Self::InconsistentTypes,
        Self::Duplicates,
        Self::ConstantColumns,
        Self::Correlations,
        Self::Outliers,
        Self::Skewness,
        Self::Trends,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OverallMissing => "overall_missing",
            Self::ColumnMissing => "column_missing",
            Self::InconsistentTypes => "inconsistent_types",
            Self::Duplicates => "duplicates",
            Self::ConstantColumns => "constant_columns",
            Self::Correlations => "correlations",
            Self::Outliers => "outliers",
            Self::Skewness => "skewness",
            Self::Trends => "trends",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Share of non-missing values that must parse as the voted type for the
    /// column to take that type (otherwise it stays categorical).
    pub min_type_fraction: f64,
    /// Cell texts treated as missing, compared after trimming.
    pub null_markers: Vec<String>,
    /// Missing share at or above which a column gets a warning.
    pub missing_warning_threshold: f64,
    pub duplicate_mode: DuplicateMode,
    /// Minimum |r| for a pair to be reported.
    pub correlation_threshold: f64,
    /// Tukey fence multiplier.
    pub outlier_iqr_multiplier: f64,
    /// Minimum fitted change across the series, as a share of the value
    /// range, for a trend to count as increasing or decreasing.
    pub trend_slope_threshold: f64,
    pub min_trend_points: usize,
    /// Outliers needed on a column before an insight is raised.
    pub outlier_insight_min_count: usize,
    pub skew_insight_threshold: f64,
    /// Whole-table missing share above which an insight is raised.
    pub overall_missing_insight_threshold: f64,
    /// Enabled insight rules. Output order is fixed by [`InsightRule`].
    pub insight_rules: Vec<InsightRule>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_type_fraction: 0.8,
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| (*s).to_owned()).collect(),
            missing_warning_threshold: 0.3,
            duplicate_mode: DuplicateMode::Exact,
            correlation_threshold: 0.5,
            outlier_iqr_multiplier: 1.5,
            trend_slope_threshold: 0.1,
            min_trend_points: 3,
            outlier_insight_min_count: 1,
            skew_insight_threshold: 1.0,
            overall_missing_insight_threshold: 0.1,
            insight_rules: InsightRule::ALL.to_vec(),
        }
    }
}

impl AnalysisConfig {
    /// Checks every field's range.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_fraction("min_type_fraction", self.min_type_fraction, false)?;
        check_fraction("missing_warning_threshold", self.missing_warning_threshold, false)?;
        check_fraction("correlation_threshold", self.correlation_threshold, true)?;
        check_fraction(
            "overall_missing_insight_threshold",
            self.overall_missing_insight_threshold,
            true,
        )?;

        if !self.outlier_iqr_multiplier.is_finite() || self.outlier_iqr_multiplier <= 0.0 {
            return Err(AnalysisError::config(format!(
                "outlier_iqr_multiplier must be a positive number, got {}",
                self.outlier_iqr_multiplier
            )));
        }
        check_non_negative("trend_slope_threshold", self.trend_slope_threshold)?;
        check_non_negative("skew_insight_threshold", self.skew_insight_threshold)?;

        if self.min_trend_points < 2 {
            return Err(AnalysisError::config(format!(
                "min_trend_points must be at least 2, got {}",
                self.min_trend_points
            )));
        }
        if self.outlier_insight_min_count == 0 {
            return Err(AnalysisError::config(
                "outlier_insight_min_count must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn rule_enabled(&self, rule: InsightRule) -> bool {
        self.insight_rules.contains(&rule)
    }
}

fn check_fraction(field: &str, value: f64, allow_zero: bool) -> Result<()> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if value.is_finite() && lower_ok && value <= 1.0 {
        Ok(())
    } else {
        let range = if allow_zero { "[0, 1]" } else { "(0, 1]" };
        Err(AnalysisError::config(format!(
            "{field} must be within {range}, got {value}"
        )))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::config(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

/// Reads a configuration file and validates it.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid JSON, or holds
/// out-of-range values.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.validate()?;
    tracing::debug!("Loaded analysis config from {}", path.display());
    Ok(config)
}

/// Writes a configuration as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Fails on I/O or serialization errors.
pub fn save_config(config: &AnalysisConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
