use super::table::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    DateTime,
    Boolean,
    Unknown,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::DateTime => "datetime",
            Self::Boolean => "boolean",
            Self::Unknown => "unknown",
        }
    }
}

// COLUMN STATISTICS

#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct NumericStats {
    /// Non-missing values.
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub skewness: Option<f64>,
    /// Excess kurtosis.
    pub kurtosis: Option<f64>,
}

#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct FrequencyStats {
    pub count: usize,
    pub missing: usize,
    pub distinct: usize,
    pub mode: Option<String>,
    pub mode_frequency: usize,
}

#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct TemporalStats {
    #[serde(flatten)]
    pub frequency: FrequencyStats,
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Frequency(FrequencyStats),
    Temporal(TemporalStats),
}

impl ColumnStats {
    pub fn count(&self) -> usize {
        match self {
            Self::Numeric(s) => s.count,
            Self::Frequency(s) => s.count,
            Self::Temporal(s) => s.frequency.count,
        }
    }

    pub fn missing(&self) -> usize {
        match self {
            Self::Numeric(s) => s.missing,
            Self::Frequency(s) => s.missing,
            Self::Temporal(s) => s.frequency.missing,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericStats> {
        match self {
            Self::Numeric(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_frequency(&self) -> Option<&FrequencyStats> {
        match self {
            Self::Frequency(s) => Some(s),
            Self::Temporal(s) => Some(&s.frequency),
            Self::Numeric(_) => None,
        }
    }
}

// QUALITY FINDINGS

#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingValues,
    DuplicateRows,
    InconsistentType,
    ConstantColumn,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingValues => "missing_values",
            Self::DuplicateRows => "duplicate_rows",
            Self::InconsistentType => "inconsistent_type",
            Self::ConstantColumn => "constant_column",
        }
    }
}

#[derive(Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct QualityFinding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub columns: Vec<String>,
    /// Affected rows. For duplicates, the first row of each duplicate group.
    pub rows: Vec<usize>,
    /// Size of each duplicate group, aligned with `rows`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_sizes: Vec<usize>,
    pub message: String,
}

// CORRELATIONS

#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub const STRONG: f64 = 0.8;
    pub const MODERATE: f64 = 0.5;

    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= Self::STRONG {
            Self::Strong
        } else if magnitude >= Self::MODERATE {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct CorrelationPair {
    pub column_a: String,
    pub column_b: String,
    pub coefficient: f64,
    /// Rows where both columns were present.
    pub observations: usize,
    pub strength: CorrelationStrength,
}

// OUTLIERS

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct OutlierRecord {
    pub column: String,
    pub row: usize,
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Distance past the violated bound, in IQR units.
    pub deviation: f64,
}

// TRENDS

#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Flat => "flat",
        }
    }
}

#[derive(Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TrendConfidence {
    Low,
    Medium,
    High,
}

impl TrendConfidence {
    pub const HIGH_R2: f64 = 0.7;
    pub const MEDIUM_R2: f64 = 0.4;

    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared >= Self::HIGH_R2 {
            Self::High
        } else if r_squared >= Self::MEDIUM_R2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct TrendRecord {
    pub column: String,
    pub direction: TrendDirection,
    /// Fitted change per row.
    pub slope: f64,
    /// Fitted change across the observed rows as a share of the value range.
    pub relative_change: f64,
    pub r_squared: f64,
    pub confidence: TrendConfidence,
    pub points: usize,
    pub first_half_mean: Option<f64>,
    pub second_half_mean: Option<f64>,
    /// Second-half mean relative to first-half mean, in percent.
    pub change_pct: Option<f64>,
}

// OVERVIEW & AGGREGATE

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct ColumnOverview {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Clone, Serialize, Debug, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub numeric: usize,
    pub categorical: usize,
    pub datetime: usize,
    pub boolean: usize,
    pub unknown: usize,
}

impl KindCounts {
    pub fn record(&mut self, kind: ColumnKind) {
        match kind {
            ColumnKind::Numeric => self.numeric += 1,
            ColumnKind::Categorical => self.categorical += 1,
            ColumnKind::DateTime => self.datetime += 1,
            ColumnKind::Boolean => self.boolean += 1,
            ColumnKind::Unknown => self.unknown += 1,
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct DatasetOverview {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnOverview>,
    pub kind_counts: KindCounts,
    pub missing_cells: usize,
    pub missing_pct: f64,
    pub duplicate_rows: usize,
    pub duplicate_pct: f64,
    /// 1.0 for a table without findings, lowered per finding.
    pub health_score: f64,
}

/// Everything one analysis produces. Built once, never mutated.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct AnalysisResult {
    pub overview: DatasetOverview,
    pub table: Table,
    pub column_stats: IndexMap<String, ColumnStats>,
    pub quality_findings: Vec<QualityFinding>,
    pub correlations: Vec<CorrelationPair>,
    pub outliers: Vec<OutlierRecord>,
    pub trends: Vec<TrendRecord>,
    pub insights: Vec<String>,
}

impl AnalysisResult {
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &QualityFinding> {
        self.quality_findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn outliers_for<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a OutlierRecord> {
        self.outliers.iter().filter(move |o| o.column == column)
    }

    pub fn trend_for(&self, column: &str) -> Option<&TrendRecord> {
        self.trends.iter().find(|t| t.column == column)
    }

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
