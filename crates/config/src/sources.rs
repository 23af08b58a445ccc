//! Source table locations
//!
//! Every table is a CSV export. File names are resolved against
//! `data_dir` unless they are absolute.

use std::path::PathBuf;

use serde::Deserialize;

/// Source file configuration
///
/// ```toml
/// [sources]
/// data_dir = "data"
/// events = "consumption_histories*.csv"
/// organizations = "organizations.csv"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Base directory for relative file names. Default: "data"
    pub data_dir: PathBuf,

    /// Event log file name or glob pattern.
    /// Default: "consumption_histories*.csv"
    pub events: String,

    /// Organizations (id, name)
    pub organizations: String,

    /// Users (id, first_name, last_name)
    pub users: String,

    /// Contacts (id, company_id, tag_list, job_type_list)
    pub contacts: String,

    /// Companies (id, tag_list)
    pub companies: String,

    /// Job types (id, name or type)
    pub job_types: String,

    /// Sectors (id, name, class)
    pub sectors: String,

    /// Sector classes (id, name)
    pub sector_classes: String,

    /// Workforce brackets (id, name)
    pub workforce_brackets: String,

    /// Sales brackets (id, name)
    pub sales_brackets: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            events: "consumption_histories*.csv".into(),
            organizations: "organizations.csv".into(),
            users: "users.csv".into(),
            contacts: "contacts.csv".into(),
            companies: "companies.csv".into(),
            job_types: "job_types.csv".into(),
            sectors: "sectors.csv".into(),
            sector_classes: "sector_classes.csv".into(),
            workforce_brackets: "workforce_brackets.csv".into(),
            sales_brackets: "sales_brackets.csv".into(),
        }
    }
}

impl SourcesConfig {
    /// Resolve a configured file name against `data_dir`
    pub fn resolve(&self, file: &str) -> PathBuf {
        let path = PathBuf::from(file);
        if path.is_absolute() {
            path
        } else {
            self.data_dir.join(path)
        }
    }

    /// All configured file names paired with their key, in declaration order
    pub fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("events", self.events.as_str()),
            ("organizations", self.organizations.as_str()),
            ("users", self.users.as_str()),
            ("contacts", self.contacts.as_str()),
            ("companies", self.companies.as_str()),
            ("job_types", self.job_types.as_str()),
            ("sectors", self.sectors.as_str()),
            ("sector_classes", self.sector_classes.as_str()),
            ("workforce_brackets", self.workforce_brackets.as_str()),
            ("sales_brackets", self.sales_brackets.as_str()),
        ]
    }
}
