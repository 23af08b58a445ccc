//! Summary command - dataset overview

use anyhow::Result;
use clap::Args;
use conso_config::Config;
use serde::Serialize;

use crate::cmd::open_dashboard;
use crate::cmd::output::{self, OutputFormat};

/// Summary command arguments
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

#[derive(Debug, Serialize)]
struct Summary {
    events: usize,
    event_files: usize,
    unparsed_dates: usize,
    earliest: Option<String>,
    latest: Option<String>,
    default_window: Option<(String, String)>,
    type_ids: Vec<i64>,
    organizations: usize,
    users: usize,
    unmatched_contacts: usize,
    unmatched_companies: usize,
    malformed_tags: usize,
}

/// Run the summary command
pub fn run(args: SummaryArgs, config: &Config) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let dashboard = open_dashboard(config)?;
    let state = dashboard.state();
    let table = state.table();
    let enrich = state.enrich_stats();

    let summary = Summary {
        events: table.len(),
        event_files: state.load_stats().event_files,
        unparsed_dates: state.load_stats().unparsed_dates,
        earliest: table.earliest_creation_date().map(|d| d.to_rfc3339()),
        latest: table.latest_creation_date().map(|d| d.to_rfc3339()),
        default_window: table
            .default_range(config.dashboard.default_window_days)
            .ok()
            .map(|r| (r.start.date_naive().to_string(), r.end.date_naive().to_string())),
        type_ids: table.type_ids(),
        organizations: state.catalogs().organizations.len(),
        users: state.catalogs().users.len(),
        unmatched_contacts: enrich.unmatched_contacts,
        unmatched_companies: enrich.unmatched_companies,
        malformed_tags: enrich.malformed_contact_tags + enrich.malformed_company_tags,
    };

    if format == OutputFormat::Json {
        return output::print_json(&summary);
    }

    let none = || "-".to_string();
    println!("Events:              {}", summary.events);
    println!("Event files:         {}", summary.event_files);
    println!("Unparsed dates:      {}", summary.unparsed_dates);
    println!("Earliest event:      {}", summary.earliest.clone().unwrap_or_else(none));
    println!("Latest event:        {}", summary.latest.clone().unwrap_or_else(none));
    match &summary.default_window {
        Some((start, end)) => println!("Default window:      {} .. {}", start, end),
        None => println!("Default window:      -"),
    }
    println!("Type codes:          {:?}", summary.type_ids);
    println!("Organizations:       {}", summary.organizations);
    println!("Users:               {}", summary.users);
    println!("Unmatched contacts:  {}", summary.unmatched_contacts);
    println!("Unmatched companies: {}", summary.unmatched_companies);
    println!("Malformed tag lists: {}", summary.malformed_tags);

    Ok(())
}
