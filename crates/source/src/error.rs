//! Source loading errors
//!
//! Every variant is fatal: a dashboard is never built from a partial snapshot.

/// Errors that can occur while reading source tables
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A reference table file does not exist
    #[error("{table} file not found: {path}")]
    MissingFile {
        /// Table name
        table: &'static str,
        /// Expected location
        path: String,
    },

    /// The event glob matched nothing
    #[error("no event files match pattern: {0}")]
    NoDataFiles(String),

    /// A required column is absent from a table
    #[error("{table} is missing required column '{column}'")]
    MissingColumn {
        /// Table name
        table: &'static str,
        /// Column name
        column: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error (CSV parsing, column access)
    #[error("polars error: {0}")]
    Polars(String),

    /// Invalid glob pattern
    #[error("invalid file pattern: {0}")]
    Pattern(String),
}

impl SourceError {
    /// Create a MissingColumn error
    pub fn missing_column(table: &'static str, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table,
            column: column.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for SourceError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        SourceError::Polars(err.to_string())
    }
}

impl From<glob::PatternError> for SourceError {
    fn from(err: glob::PatternError) -> Self {
        SourceError::Pattern(err.to_string())
    }
}

impl From<glob::GlobError> for SourceError {
    fn from(err: glob::GlobError) -> Self {
        SourceError::Io(std::io::Error::other(err.to_string()))
    }
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;
