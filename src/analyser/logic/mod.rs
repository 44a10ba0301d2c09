pub mod analysis;
pub mod cleaning;
pub mod correlation;
pub mod health;
pub mod interpretation;
pub mod io;
pub mod outliers;
pub mod profiling;
pub mod table;
pub mod trends;
pub mod types;

pub use analysis::{Analyzer, build_overview, run_full_analysis};
pub use cleaning::{CellParser, CleaningOutcome, CoercedCells, clean_table};
pub use health::{QualityReport, assess_quality, calculate_health_score, find_duplicate_groups};
pub use io::{load_raw_table, parse_json_table, read_csv, save_result};
pub use table::{CellValue, Column, RawColumn, RawTable, RawValue, Table};
pub use types::{
    AnalysisResult, ColumnKind, ColumnStats, CorrelationPair, CorrelationStrength,
    DatasetOverview, FindingKind, FrequencyStats, NumericStats, OutlierRecord, QualityFinding,
    Severity, TemporalStats, TrendConfidence, TrendDirection, TrendRecord,
};
