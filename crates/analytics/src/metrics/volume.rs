//! Event volume metric
//!
//! Event counts per calendar bucket. Every bucket of the filter's range
//! appears, empty ones with a zero count.

use std::collections::HashMap;

use crate::enrich::EnrichedRow;
use crate::filter::Granularity;
use crate::metrics::{Metric, MetricContext};
use crate::timeseries::{TimeSeriesData, TimeSeriesPoint};

/// Event volume metric
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeMetric {
    /// Overrides the filter's granularity
    granularity: Option<Granularity>,
}

impl VolumeMetric {
    /// Create a volume metric using the filter's granularity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a volume metric with a fixed granularity
    pub fn with_granularity(granularity: Granularity) -> Self {
        Self {
            granularity: Some(granularity),
        }
    }
}

impl Metric for VolumeMetric {
    type Output = TimeSeriesData;

    fn compute(&self, rows: &[&EnrichedRow], ctx: &MetricContext<'_>) -> TimeSeriesData {
        let granularity = self.granularity.unwrap_or(ctx.filter.granularity);
        let keys = ctx.filter.time_range.bucket_keys(granularity);

        let slots: HashMap<&str, usize> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.as_str(), i))
            .collect();

        let mut counts = vec![0u64; keys.len()];
        for ts in rows.iter().filter_map(|r| r.creation_date) {
            if let Some(&slot) = slots.get(granularity.key_of(ts).as_str()) {
                counts[slot] += 1;
            }
        }

        let points = keys
            .into_iter()
            .zip(counts)
            .map(|(key, count)| TimeSeriesPoint::new(key, count))
            .collect();

        TimeSeriesData::from_points(points)
    }

    fn name(&self) -> &'static str {
        "volume"
    }
}
