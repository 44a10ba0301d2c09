//! Centralized error handling for tabular-insight.
//!
//! ## Error Categories
//!
//! The engine itself only ever fails in three ways:
//!
//! - [`AnalysisError::InputValidation`]: the table handed in is empty, ragged
//!   or has unusable column names. Nothing is analysed.
//! - [`AnalysisError::Configuration`]: a configuration value is out of range.
//!   Raised when the engine is constructed, before any table is seen.
//! - [`AnalysisError::InternalInconsistency`]: a column's committed type does
//!   not match the values it holds. This is a defect, never a data problem.
//!
//! Insufficient data is not an error: statistics that cannot be computed are
//! reported as `None`.
//!
//! The remaining variants belong to the loading/saving plumbing around the
//! engine (files, CSV, JSON).
//!
//! ## Context Extension Trait
//!
//! The `ResultExt` trait adds `.context()` to any `Result` whose error
//! converts into [`AnalysisError`]:
//!
//! ```no_run
//! use tabular_insight::error::ResultExt as _;
//!
//! fn read_table_text() -> tabular_insight::error::Result<String> {
//!     let text = std::fs::read_to_string("table.csv").context("Failed to read table")?;
//!     Ok(text)
//! }
//! ```

use thiserror::Error;

/// Main error type for tabular-insight operations.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Empty table, zero columns, ragged columns or bad column names.
    #[error("Input validation failed: {0}")]
    InputValidation(String),

    /// Out-of-range configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A typed column holds a value of another type at compute time.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl AnalysisError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::InputValidation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn inconsistency(msg: impl Into<String>) -> Self {
        Self::InternalInconsistency(msg.into())
    }
}

/// Result type alias for tabular-insight operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AnalysisError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: AnalysisError = e.into();
            AnalysisError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: AnalysisError = e.into();
            AnalysisError::Other(format!("{}: {}", f(), err))
        })
    }
}
