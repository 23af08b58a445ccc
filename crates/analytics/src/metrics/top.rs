//! Top categories metric

use crate::breakdown::{Breakdown, Dimension};
use crate::enrich::EnrichedRow;
use crate::metrics::{BreakdownMetric, Metric, MetricContext};

/// The largest categories of a dimension
#[derive(Debug, Clone, Copy)]
pub struct TopMetric {
    dimension: Dimension,
    /// Number of categories to return
    limit: usize,
}

impl TopMetric {
    /// Create a new top metric
    pub fn new(dimension: Dimension, limit: usize) -> Self {
        Self { dimension, limit }
    }
}

impl Metric for TopMetric {
    type Output = Breakdown;

    fn compute(&self, rows: &[&EnrichedRow], ctx: &MetricContext<'_>) -> Breakdown {
        BreakdownMetric::new(self.dimension)
            .compute(rows, ctx)
            .truncate(self.limit)
    }

    fn name(&self) -> &'static str {
        "top"
    }
}
