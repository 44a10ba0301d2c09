//! Table analysis: type inference, statistics, quality checks and insights.

pub mod logic;

pub use logic::{AnalysisResult, Analyzer, RawTable};
