//! Categorical breakdown metric

use std::collections::HashMap;

use crate::breakdown::{Breakdown, BreakdownRow, Dimension, UNKNOWN_LABEL};
use crate::enrich::EnrichedRow;
use crate::metrics::{Metric, MetricContext};

/// Counts per category of one dimension
#[derive(Debug, Clone, Copy)]
pub struct BreakdownMetric {
    dimension: Dimension,
    rates: bool,
}

impl BreakdownMetric {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            rates: false,
        }
    }

    /// Also compute each category's share of the filtered rows
    pub fn with_rates(mut self) -> Self {
        self.rates = true;
        self
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }
}

impl Metric for BreakdownMetric {
    type Output = Breakdown;

    fn compute(&self, rows: &[&EnrichedRow], ctx: &MetricContext<'_>) -> Breakdown {
        // groups keep first-seen order so the stable sort breaks ties by it
        let mut groups: Vec<BreakdownRow> = Vec::new();
        let mut slots: HashMap<Option<i64>, usize> = HashMap::new();

        for row in rows {
            let resolved = self.dimension.resolve(row, ctx.catalogs);
            let key = resolved.as_ref().map(|(code, _)| *code);

            let slot = *slots.entry(key).or_insert_with(|| {
                let label = resolved
                    .map(|(_, label)| label)
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
                groups.push(BreakdownRow {
                    code: key,
                    label,
                    count: 0,
                    rate: None,
                });
                groups.len() - 1
            });
            groups[slot].count += 1;
        }

        groups.sort_by(|a, b| b.count.cmp(&a.count));

        let breakdown = Breakdown {
            dimension: self.dimension,
            rows: groups,
            total: rows.len() as u64,
        };
        if self.rates {
            breakdown.with_rates()
        } else {
            breakdown
        }
    }

    fn name(&self) -> &'static str {
        "breakdown"
    }
}
