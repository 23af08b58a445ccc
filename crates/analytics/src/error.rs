//! Analytics error types

use thiserror::Error;

/// Analytics errors
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Invalid time range
    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    /// Invalid granularity
    #[error("invalid granularity: {0}")]
    InvalidGranularity(String),

    /// Unknown breakdown dimension
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Unknown comparison mode
    #[error("invalid compare mode: {0}")]
    InvalidCompareMode(String),

    /// The event log holds no timestamped rows
    #[error("no dated events in the event log")]
    NoDatedEvents,

    /// Source loading failed (fatal)
    #[error("source error: {0}")]
    Source(#[from] conso_source::SourceError),
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
