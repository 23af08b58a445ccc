//! Report commands: volume, breakdown, top
//!
//! # Usage
//!
//! ```bash
//! # Volume over the default window, daily
//! conso volume
//! conso volume --range 3m --granularity month --compare previous
//!
//! # Breakdowns
//! conso breakdown job-type --rates
//! conso breakdown sector-class --from 2024-01-01 --to 2024-06-30 --types 1,2
//!
//! # Leaderboards
//! conso top
//! conso top user --limit 20 --org-name "Acme"
//! ```

use anyhow::{Context, Result};
use chrono::Days;
use clap::Args;
use conso_analytics::{
    AnalyticsError, CompareMode, Dimension, Filter, Granularity, MetricsEngine, TimeRange,
};
use conso_config::Config;

use crate::cmd::output::{self, OutputFormat};
use crate::cmd::{default_granularity, empty_selection, open_dashboard};

/// Filter selection shared by every report
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// First day (YYYY-MM-DD). Default: end day minus the default window
    #[arg(long)]
    pub from: Option<String>,

    /// Last day (YYYY-MM-DD), taken at midnight. Default: day of the latest event
    #[arg(long)]
    pub to: Option<String>,

    /// Time range anchored on the latest event (31d, 2w, 3m, 1y, mtd, ytd, 2024-01-01,2024-01-31)
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    pub range: Option<String>,

    /// Type codes (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub types: Vec<i64>,

    /// Organization ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub orgs: Vec<i64>,

    /// Organization name (repeatable, case-insensitive)
    #[arg(long = "org-name")]
    pub org_names: Vec<String>,

    /// User ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub users: Vec<i64>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Volume command arguments
#[derive(Args, Debug)]
pub struct VolumeArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Bucket unit (day, month). Default: [dashboard].granularity
    #[arg(short, long)]
    pub granularity: Option<String>,

    /// Compare to previous period (previous, yoy)
    #[arg(short = 'C', long)]
    pub compare: Option<String>,
}

/// Breakdown command arguments
#[derive(Args, Debug)]
pub struct BreakdownArgs {
    /// Dimension (type, organization, user, job-type, hierarchy, company-size,
    /// structure-type, workforce, revenue, sector, sector-class)
    pub dimension: String,

    /// Include each category's share of the filtered events
    #[arg(long)]
    pub rates: bool,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Top command arguments
#[derive(Args, Debug)]
pub struct TopArgs {
    /// Dimension to rank
    #[arg(default_value = "organization")]
    pub dimension: String,

    /// Number of results. Default: [dashboard].top_limit
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Run the volume command
pub fn run_volume(args: VolumeArgs, config: &Config) -> Result<()> {
    let format = OutputFormat::parse(&args.selection.format)?;
    let engine = open_dashboard(config)?.engine();

    let granularity = match &args.granularity {
        Some(g) => Granularity::parse(g)?,
        None => default_granularity(config.dashboard.granularity),
    };
    let mut filter = build_filter(&args.selection, &engine, config)?.with_granularity(granularity);
    if let Some(compare) = &args.compare {
        filter = filter.with_compare(CompareMode::parse(compare)?);
    }

    let result = engine.volume_with_comparison(&filter);
    output::print_timeseries(&result, format)?;
    print_footer(&filter, format);
    Ok(())
}

/// Run the breakdown command
pub fn run_breakdown(args: BreakdownArgs, config: &Config) -> Result<()> {
    let format = OutputFormat::parse(&args.selection.format)?;
    let dimension = Dimension::parse(&args.dimension)?;
    let engine = open_dashboard(config)?.engine();
    let filter = build_filter(&args.selection, &engine, config)?;

    let result = if args.rates {
        engine.breakdown_with_rates(&filter, dimension)
    } else {
        engine.breakdown(&filter, dimension)
    };
    output::print_breakdown(&result, format)?;
    print_footer(&filter, format);
    Ok(())
}

/// Run the top command
pub fn run_top(args: TopArgs, config: &Config) -> Result<()> {
    let format = OutputFormat::parse(&args.selection.format)?;
    let dimension = Dimension::parse(&args.dimension)?;
    let limit = args.limit.unwrap_or(config.dashboard.top_limit);
    let engine = open_dashboard(config)?.engine();
    let filter = build_filter(&args.selection, &engine, config)?;

    let result = engine.top(&filter, dimension, limit);
    output::print_breakdown(&result, format)?;
    print_footer(&filter, format);
    Ok(())
}

/// Build the filter for a selection against the loaded table
pub fn build_filter(
    selection: &SelectionArgs,
    engine: &MetricsEngine,
    config: &Config,
) -> Result<Filter> {
    let range = resolve_range(selection, engine, config.dashboard.default_window_days)?;

    let mut organizations = selection.orgs.clone();
    for name in &selection.org_names {
        let id = engine
            .catalogs()
            .organizations
            .id_by_name(name)
            .with_context(|| format!("unknown organization: {}", name))?;
        organizations.push(id);
    }

    Ok(Filter::new(range)
        .with_types(selection.types.iter().copied())
        .with_organizations(organizations)
        .with_users(selection.users.iter().copied())
        .with_empty_selection(empty_selection(config.dashboard.empty_selection)))
}

fn resolve_range(
    selection: &SelectionArgs,
    engine: &MetricsEngine,
    window_days: u32,
) -> Result<TimeRange> {
    let latest = engine
        .table()
        .latest_creation_date()
        .ok_or(AnalyticsError::NoDatedEvents)?;

    if let Some(range) = &selection.range {
        return Ok(TimeRange::parse_at(range, latest)?);
    }

    if selection.from.is_none() && selection.to.is_none() {
        return Ok(engine.table().default_range(window_days)?);
    }

    let end = match &selection.to {
        Some(to) => conso_analytics::timerange::parse_date(to)?,
        None => latest.date_naive(),
    };
    let start = match &selection.from {
        Some(from) => conso_analytics::timerange::parse_date(from)?,
        None => end
            .checked_sub_days(Days::new(u64::from(window_days)))
            .with_context(|| format!("{} day window before {} is out of range", window_days, end))?,
    };
    Ok(TimeRange::from_dates(start, end)?)
}

fn print_footer(filter: &Filter, format: OutputFormat) {
    if format == OutputFormat::Table {
        eprintln!(
            "\n[{} .. {}]",
            filter.time_range.start.date_naive(),
            filter.time_range.end.date_naive()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_utils::setup;

    #[test]
    fn test_default_window() {
        let (_dir, config, engine) = setup();
        let filter = build_filter(&SelectionArgs::default(), &engine, &config).unwrap();

        assert_eq!(filter.time_range.start.date_naive().to_string(), "2024-02-18");
        assert_eq!(filter.time_range.end.date_naive().to_string(), "2024-03-20");
    }

    #[test]
    fn test_range_anchored_on_latest_event() {
        let (_dir, config, engine) = setup();
        let selection = SelectionArgs {
            range: Some("7d".into()),
            ..SelectionArgs::default()
        };
        let filter = build_filter(&selection, &engine, &config).unwrap();
        assert_eq!(filter.time_range.start.date_naive().to_string(), "2024-03-14");
    }

    #[test]
    fn test_oversized_range_is_an_error() {
        let (_dir, config, engine) = setup();
        let selection = SelectionArgs {
            range: Some("100000000d".into()),
            ..SelectionArgs::default()
        };
        let err = build_filter(&selection, &engine, &config).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_from_only() {
        let (_dir, config, engine) = setup();
        let selection = SelectionArgs {
            from: Some("2024-03-01".into()),
            ..SelectionArgs::default()
        };
        let filter = build_filter(&selection, &engine, &config).unwrap();
        assert_eq!(filter.time_range.end.date_naive().to_string(), "2024-03-20");
        assert_eq!(engine.row_count(&filter), 1);
    }

    #[test]
    fn test_org_names_resolved() {
        let (_dir, config, engine) = setup();
        let selection = SelectionArgs {
            orgs: vec![10],
            org_names: vec!["globex".into()],
            ..SelectionArgs::default()
        };
        let filter = build_filter(&selection, &engine, &config).unwrap();
        assert_eq!(filter.organizations.iter().copied().collect::<Vec<_>>(), vec![10, 20]);

        let unknown = SelectionArgs {
            org_names: vec!["Initech".into()],
            ..SelectionArgs::default()
        };
        assert!(build_filter(&unknown, &engine, &config).is_err());
    }
}
