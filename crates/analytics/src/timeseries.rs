//! Time series data types
//!
//! Bucketed event counts with summary statistics and optional comparison data.

use serde::{Deserialize, Serialize};

/// A single bucket in a time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Bucket key (`YYYY-MM-DD` or `YYYY-MM`)
    pub date: String,
    /// Number of matching events
    pub count: u64,
}

impl TimeSeriesPoint {
    /// Create a new point
    pub fn new(date: impl Into<String>, count: u64) -> Self {
        Self {
            date: date.into(),
            count,
        }
    }
}

/// Time series data with aggregated statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesData {
    /// Data points, chronological
    pub points: Vec<TimeSeriesPoint>,
    /// Total (sum of all counts)
    pub total: u64,
    /// Smallest bucket
    pub min: u64,
    /// Largest bucket
    pub max: u64,
    /// Average per bucket
    pub avg: f64,
    /// Optional comparison data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonData>,
}

impl TimeSeriesData {
    /// Create empty time series
    pub fn empty() -> Self {
        Self::from_points(Vec::new())
    }

    /// Create time series from points, calculating stats
    pub fn from_points(points: Vec<TimeSeriesPoint>) -> Self {
        let total: u64 = points.iter().map(|p| p.count).sum();
        let min = points.iter().map(|p| p.count).min().unwrap_or(0);
        let max = points.iter().map(|p| p.count).max().unwrap_or(0);
        let avg = if points.is_empty() {
            0.0
        } else {
            total as f64 / points.len() as f64
        };

        Self {
            points,
            total,
            min,
            max,
            avg,
            comparison: None,
        }
    }

    /// Add comparison data
    pub fn with_comparison(mut self, comparison: ComparisonData) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// `(key, count)` pairs in bucket order
    pub fn pairs(&self) -> Vec<(&str, u64)> {
        self.points.iter().map(|p| (p.date.as_str(), p.count)).collect()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Comparison metrics between current and previous period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonData {
    /// Previous period total
    pub previous_total: u64,
    /// Absolute change (current - previous)
    pub change: i64,
    /// Percent change ((current - previous) / previous * 100)
    pub percent_change: f64,
    /// Previous period data points (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_points: Option<Vec<TimeSeriesPoint>>,
}

impl ComparisonData {
    /// Calculate comparison from current and previous totals
    pub fn calculate(current_total: u64, previous_total: u64) -> Self {
        let change = current_total as i64 - previous_total as i64;
        let percent_change = if previous_total != 0 {
            (change as f64 / previous_total as f64) * 100.0
        } else if current_total > 0 {
            100.0
        } else {
            0.0
        };

        Self {
            previous_total,
            change,
            percent_change,
            previous_points: None,
        }
    }

    /// Add previous period points
    pub fn with_points(mut self, points: Vec<TimeSeriesPoint>) -> Self {
        self.previous_points = Some(points);
        self
    }
}
