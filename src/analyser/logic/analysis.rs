//! The analysis pipeline: clean, profile, check quality, then derive
//! correlations, outliers, trends and insights from the cleaned table.

use super::cleaning::{CellParser, clean_table};
use super::correlation::find_correlations;
use super::health::{assess_quality, calculate_health_score};
use super::interpretation::{InsightInputs, generate_insights};
use super::outliers::detect_outliers;
use super::profiling::describe_table;
use super::table::{RawTable, Table};
use super::trends::detect_trends;
use super::types::{AnalysisResult, ColumnOverview, DatasetOverview, KindCounts, QualityFinding};
use crate::config::AnalysisConfig;
use crate::error::Result;
use std::time::Instant;

/// The analysis engine. Holds a validated configuration and the compiled
/// cell parser; immutable and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    parser: CellParser,
}

impl Analyzer {
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::Configuration`] if the
    /// configuration is out of range.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let parser = CellParser::new(&config.null_markers)?;
        Ok(Self { config, parser })
    }

    /// # Errors
    ///
    /// Fails only if the default configuration cannot build a parser.
    pub fn with_defaults() -> Result<Self> {
        Self::new(AnalysisConfig::default())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs the whole pipeline over one table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnalysisError::InputValidation`] for empty or
    /// malformed tables and [`crate::error::AnalysisError::InternalInconsistency`]
    /// if a typed column contradicts its kind. Nothing partial is returned.
    pub fn analyze(&self, raw: &RawTable) -> Result<AnalysisResult> {
        let start = Instant::now();
        let config = &self.config;

        let cleaned = clean_table(raw, &self.parser, config)?;
        let table = cleaned.table;
        tracing::debug!(
            rows = table.row_count,
            columns = table.column_count(),
            coerced_columns = cleaned.coerced.len(),
            "Cleaned table"
        );

        let column_stats = describe_table(&table)?;
        tracing::debug!("Computed descriptive statistics");

        let quality = assess_quality(&table, &cleaned.coerced, config);
        let correlations = find_correlations(&table, config.correlation_threshold)?;
        tracing::debug!(pairs = correlations.len(), "Computed correlations");

        let outliers = detect_outliers(&table, config.outlier_iqr_multiplier)?;
        tracing::debug!(outliers = outliers.len(), "Detected outliers");

        let trends = detect_trends(&table, config)?;
        tracing::debug!(trends = trends.len(), "Detected trends");

        let overview = build_overview(&table, quality.duplicate_rows, &quality.findings);
        let insights = generate_insights(
            &InsightInputs {
                row_count: table.row_count,
                column_count: table.column_count(),
                missing_cells: overview.missing_cells,
                duplicate_rows: quality.duplicate_rows,
                column_stats: &column_stats,
                findings: &quality.findings,
                correlations: &correlations,
                outliers: &outliers,
                trends: &trends,
            },
            config,
        );

        tracing::info!(
            rows = table.row_count,
            columns = table.column_count(),
            findings = quality.findings.len(),
            insights = insights.len(),
            "Analysis finished in {:?}",
            start.elapsed()
        );

        Ok(AnalysisResult {
            overview,
            table,
            column_stats,
            quality_findings: quality.findings,
            correlations,
            outliers,
            trends,
            insights,
        })
    }
}

/// Convenience wrapper: validate `config`, build an engine and analyse once.
///
/// # Errors
///
/// See [`Analyzer::new`] and [`Analyzer::analyze`].
pub fn run_full_analysis(raw: &RawTable, config: AnalysisConfig) -> Result<AnalysisResult> {
    Analyzer::new(config)?.analyze(raw)
}

pub fn build_overview(
    table: &Table,
    duplicate_rows: usize,
    findings: &[QualityFinding],
) -> DatasetOverview {
    let mut kind_counts = KindCounts::default();
    let columns = table
        .columns
        .iter()
        .map(|c| {
            kind_counts.record(c.kind);
            ColumnOverview {
                name: c.name.clone(),
                kind: c.kind,
            }
        })
        .collect();

    let cells = table.row_count * table.column_count();
    let missing_cells = table.missing_cells();
    let pct = |part: usize, whole: usize| {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64 * 100.0
        }
    };

    DatasetOverview {
        row_count: table.row_count,
        column_count: table.column_count(),
        columns,
        kind_counts,
        missing_cells,
        missing_pct: pct(missing_cells, cells),
        duplicate_rows,
        duplicate_pct: pct(duplicate_rows, table.row_count),
        health_score: calculate_health_score(findings),
    }
}
