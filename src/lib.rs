//! # tabular-insight
//!
//! Automated analysis of tables extracted from documents. Hand it a
//! [`RawTable`] (named columns of loosely typed cells) and it returns one
//! [`AnalysisResult`]:
//!
//! - a committed type per column, with unparseable cells turned into missing
//! - descriptive statistics per column
//! - data quality findings (missing values, duplicates, inconsistent types,
//!   constant columns) and a health score
//! - Pearson correlations between numeric columns
//! - Tukey-fence outliers
//! - linear trends along row order
//! - plain-language insights
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabular_insight::analyser::logic::{Analyzer, RawColumn, RawTable};
//!
//! # fn example() -> tabular_insight::error::Result<()> {
//! let table = RawTable::default()
//!     .with_column(RawColumn::from_texts("Sales", ["10", "12", "11", "9", "10000", "13"]))
//!     .with_column(RawColumn::from_texts("Region", ["N", "S", "N", "S", "N", "S"]));
//!
//! let result = Analyzer::with_defaults()?.analyze(&table)?;
//! for insight in &result.insights {
//!     println!("{insight}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The engine is synchronous, does no I/O and holds no shared mutable state.
//! The same input and configuration always serialize to the same JSON.
//!
//! ## Modules
//!
//! - [`analyser::logic`]: the analysis pipeline and its result types
//! - [`config`]: tunable thresholds, validated once
//! - [`error`]: error types and the context extension trait
//! - [`logging`]: tracing subscriber setup for the command line

pub mod analyser;
pub mod config;
pub mod error;
pub mod logging;

pub use analyser::logic::{AnalysisResult, Analyzer, RawColumn, RawTable};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
