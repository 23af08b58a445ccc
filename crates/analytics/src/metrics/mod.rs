//! Metrics engine for dashboard queries
//!
//! Every query filters the enriched table, then hands the matching rows to a
//! metric:
//!
//! - **volume**: event counts per day or month, zero-filled
//! - **breakdown**: event counts per category, optionally with rates
//! - **top**: the first N categories of a breakdown
//!
//! Nothing is cached between calls.

mod breakdown;
mod top;
mod volume;

pub use breakdown::BreakdownMetric;
pub use top::TopMetric;
pub use volume::VolumeMetric;

use std::sync::Arc;

use conso_source::Catalogs;
use tracing::debug;

use crate::breakdown::{Breakdown, Dimension};
use crate::enrich::{EnrichedRow, EnrichedTable};
use crate::filter::Filter;
use crate::timeseries::{ComparisonData, TimeSeriesData};

/// Default leaderboard size
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// What a metric can see besides the filtered rows
#[derive(Debug, Clone, Copy)]
pub struct MetricContext<'a> {
    pub filter: &'a Filter,
    pub catalogs: &'a Catalogs,
}

/// A metric computed over filtered rows
pub trait Metric {
    type Output;

    /// Compute this metric over rows that already passed the filter
    fn compute(&self, rows: &[&EnrichedRow], ctx: &MetricContext<'_>) -> Self::Output;

    /// Get the metric name for logging/identification
    fn name(&self) -> &'static str;
}

/// Metrics engine over one enriched table
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    table: Arc<EnrichedTable>,
    catalogs: Arc<Catalogs>,
    top_limit: usize,
}

impl MetricsEngine {
    /// Create a new metrics engine over a table and its catalogs
    pub fn new(table: Arc<EnrichedTable>, catalogs: Arc<Catalogs>) -> Self {
        Self {
            table,
            catalogs,
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }

    /// Set the leaderboard size used by `top_organizations`
    pub fn with_top_limit(mut self, limit: usize) -> Self {
        self.top_limit = limit;
        self
    }

    pub fn table(&self) -> &EnrichedTable {
        &self.table
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Filter the table and run a metric on the result
    pub fn execute<M: Metric>(&self, metric: &M, filter: &Filter) -> M::Output {
        let rows = filter.apply(&self.table);
        debug!(
            metric = metric.name(),
            matched = rows.len(),
            total = self.table.len(),
            "metric query"
        );
        let ctx = MetricContext {
            filter,
            catalogs: &self.catalogs,
        };
        metric.compute(&rows, &ctx)
    }

    /// Number of rows matching the filter
    pub fn row_count(&self, filter: &Filter) -> usize {
        self.table.iter().filter(|row| filter.matches(row)).count()
    }

    /// Event counts per bucket of the filter's granularity
    pub fn volume(&self, filter: &Filter) -> TimeSeriesData {
        self.execute(&VolumeMetric::new(), filter)
    }

    /// Event volume with comparison to the filter's compare period
    ///
    /// Without a compare mode this is the same as `volume`.
    pub fn volume_with_comparison(&self, filter: &Filter) -> TimeSeriesData {
        let metric = VolumeMetric::new();
        let current = self.execute(&metric, filter);

        let Some(mode) = filter.compare else {
            return current;
        };

        let previous_filter = filter.with_time_range(mode.range_for(&filter.time_range));
        let previous = self.execute(&metric, &previous_filter);

        let comparison =
            ComparisonData::calculate(current.total, previous.total).with_points(previous.points);
        current.with_comparison(comparison)
    }

    /// Counts per category, descending
    pub fn breakdown(&self, filter: &Filter, dimension: Dimension) -> Breakdown {
        self.execute(&BreakdownMetric::new(dimension), filter)
    }

    /// Counts and percentage shares per category, descending
    pub fn breakdown_with_rates(&self, filter: &Filter, dimension: Dimension) -> Breakdown {
        self.execute(&BreakdownMetric::new(dimension).with_rates(), filter)
    }

    /// The `limit` largest categories
    pub fn top(&self, filter: &Filter, dimension: Dimension, limit: usize) -> Breakdown {
        self.execute(&TopMetric::new(dimension, limit), filter)
    }

    /// Organization leaderboard
    pub fn top_organizations(&self, filter: &Filter) -> Breakdown {
        self.top(filter, Dimension::Organization, self.top_limit)
    }
}
