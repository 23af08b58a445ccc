//! Options command - selectable values for the dashboard filters

use anyhow::Result;
use clap::Args;
use conso_analytics::MetricsEngine;
use conso_config::Config;
use conso_source::{Catalog, CatalogKind};
use serde::Serialize;

use crate::cmd::open_dashboard;
use crate::cmd::output::{self, OutputFormat, csv_field};

/// Options command arguments
#[derive(Args, Debug)]
pub struct OptionsArgs {
    /// What to list (types, organizations, users, job-types, sectors,
    /// sector-classes, workforce, revenue)
    pub kind: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// One selectable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub id: i64,
    pub name: Option<String>,
}

/// Run the options command
pub fn run(args: OptionsArgs, config: &Config) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let engine = open_dashboard(config)?.engine();
    let entries = list_options(&engine, &args.kind)?;

    match format {
        OutputFormat::Json => output::print_json(&entries)?,
        OutputFormat::Csv => {
            println!("id,name");
            for entry in &entries {
                println!("{},{}", entry.id, csv_field(entry.name.as_deref().unwrap_or("")));
            }
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("(no data)");
                return Ok(());
            }
            println!("{:>10}  Name", "Id");
            println!("{}", "-".repeat(40));
            for entry in &entries {
                println!("{:>10}  {}", entry.id, entry.name.as_deref().unwrap_or("-"));
            }
        }
    }

    Ok(())
}

/// Values of one selector
pub fn list_options(engine: &MetricsEngine, kind: &str) -> Result<Vec<OptionEntry>> {
    let normalized = kind.trim().to_lowercase().replace('-', "_");
    let catalog_kind = match normalized.as_str() {
        "types" | "type" => {
            return Ok(engine
                .table()
                .type_ids()
                .into_iter()
                .map(|id| OptionEntry { id, name: None })
                .collect());
        }
        "organizations" | "orgs" => CatalogKind::Organizations,
        "users" => CatalogKind::Users,
        "job_types" => CatalogKind::JobTypes,
        "sectors" => CatalogKind::Sectors,
        "sector_classes" => CatalogKind::SectorClasses,
        "workforce" | "workforce_brackets" => CatalogKind::WorkforceBrackets,
        "revenue" | "sales_brackets" => CatalogKind::SalesBrackets,
        _ => {
            return Err(anyhow::anyhow!(
                "unknown option kind: {}. Use one of: types, organizations, users, job-types, sectors, sector-classes, workforce, revenue",
                kind
            ));
        }
    };

    Ok(entries(engine.catalogs().get(catalog_kind)))
}

fn entries(catalog: &Catalog) -> Vec<OptionEntry> {
    catalog
        .iter()
        .map(|(id, name)| OptionEntry {
            id,
            name: name.map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_utils::setup;

    #[test]
    fn test_list_types_from_events() {
        let (_dir, _config, engine) = setup();
        let types = list_options(&engine, "types").unwrap();
        assert_eq!(
            types.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_list_catalog_entries() {
        let (_dir, _config, engine) = setup();

        let users = list_options(&engine, "users").unwrap();
        assert_eq!(
            users,
            vec![OptionEntry {
                id: 7,
                name: Some("Ada Lovelace".into())
            }]
        );

        let workforce = list_options(&engine, "Workforce").unwrap();
        assert_eq!(workforce.len(), 2);
        assert_eq!(workforce[1].name.as_deref(), Some("11-50"));
    }

    #[test]
    fn test_unknown_kind() {
        let (_dir, _config, engine) = setup();
        assert!(list_options(&engine, "planets").is_err());
    }
}
