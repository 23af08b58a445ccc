//! Conso Analytics Engine
//!
//! Enrichment, filtering and aggregation of consumption events.
//!
//! # Overview
//!
//! This crate turns a source snapshot from `conso-source` into dashboard
//! figures:
//!
//! - **Tags**: decoding of the serialized tag lists of contacts and companies
//! - **Enrichment**: one denormalized row per event, joined left against
//!   contacts, companies and sectors
//! - **Filters**: time range, type/organization/user selections, granularity
//! - **Metrics**: zero-filled volume series, categorical breakdowns, top-N
//! - **Dashboard**: a session that rebuilds the table when sources change
//!
//! # Usage
//!
//! ```ignore
//! use conso_analytics::{Dashboard, Dimension, Filter};
//! use conso_source::{SnapshotLoader, SourcePaths};
//!
//! let dashboard = Dashboard::open(SnapshotLoader::new(SourcePaths::in_dir("data")))?;
//! let engine = dashboard.engine();
//!
//! let range = engine.table().default_range(31)?;
//! let filter = Filter::new(range).with_types([1]);
//!
//! let volume = engine.volume(&filter);
//! let jobs = engine.breakdown_with_rates(&filter, Dimension::JobType);
//! let leaders = engine.top_organizations(&filter);
//! ```

pub mod breakdown;
pub mod dashboard;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod tags;
pub mod timerange;
pub mod timeseries;

#[cfg(test)]
mod metrics_test;

// Re-exports for convenience
pub use breakdown::{Breakdown, BreakdownRow, Dimension, UNKNOWN_LABEL};
pub use dashboard::{Dashboard, DashboardState};
pub use enrich::{EnrichStats, EnrichedRow, EnrichedTable};
pub use error::{AnalyticsError, Result};
pub use filter::{CompareMode, EmptySelection, Filter, Granularity};
pub use metrics::{
    BreakdownMetric, DEFAULT_TOP_LIMIT, Metric, MetricContext, MetricsEngine, TopMetric,
    VolumeMetric,
};
pub use tags::{CompanyAttributes, CompanyCategory, ContactAttributes, TagDecodeError};
pub use timerange::TimeRange;
pub use timeseries::{ComparisonData, TimeSeriesData, TimeSeriesPoint};
