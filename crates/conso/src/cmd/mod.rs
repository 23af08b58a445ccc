//! Command implementations for the Conso CLI

pub mod catalog;
pub mod output;
pub mod report;
pub mod summary;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use conso_analytics::{Dashboard, EmptySelection, Granularity};
use conso_config::{Config, EmptySelectionPolicy, GranularitySetting, SourcesConfig};
use conso_source::{SnapshotLoader, SourcePaths};

/// Map the `[sources]` section to loader paths
pub fn source_paths(sources: &SourcesConfig) -> SourcePaths {
    SourcePaths {
        events: sources.resolve(&sources.events).display().to_string(),
        organizations: sources.resolve(&sources.organizations),
        users: sources.resolve(&sources.users),
        contacts: sources.resolve(&sources.contacts),
        companies: sources.resolve(&sources.companies),
        job_types: sources.resolve(&sources.job_types),
        sectors: sources.resolve(&sources.sectors),
        sector_classes: sources.resolve(&sources.sector_classes),
        workforce_brackets: sources.resolve(&sources.workforce_brackets),
        sales_brackets: sources.resolve(&sources.sales_brackets),
    }
}

/// Load the sources and open a dashboard session
pub fn open_dashboard(config: &Config) -> Result<Dashboard> {
    let loader = SnapshotLoader::new(source_paths(&config.sources));
    tracing::debug!(events = %loader.paths().events, "opening dashboard");
    let dashboard = Dashboard::open(loader).with_context(|| {
        format!(
            "failed to load sources from {}",
            config.sources.data_dir.display()
        )
    })?;
    Ok(dashboard.with_top_limit(config.dashboard.top_limit))
}

pub fn empty_selection(policy: EmptySelectionPolicy) -> EmptySelection {
    match policy {
        EmptySelectionPolicy::MatchAll => EmptySelection::MatchAll,
        EmptySelectionPolicy::MatchNone => EmptySelection::MatchNone,
    }
}

pub fn default_granularity(setting: GranularitySetting) -> Granularity {
    match setting {
        GranularitySetting::Day => Granularity::Day,
        GranularitySetting::Month => Granularity::Month,
    }
}
