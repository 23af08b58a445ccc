//! Shared fixtures for command tests

use std::fs;
use std::path::Path;

use conso_analytics::MetricsEngine;
use conso_config::Config;
use tempfile::{TempDir, tempdir};

use crate::cmd::open_dashboard;

/// Two events, two organizations, empty enrichment tables
pub fn write_sources(dir: &Path) {
    let files = [
        (
            "consumption_histories.csv",
            concat!(
                "id,contact_id,creation_date,organization_id,type_id,user_id\n",
                "1,,2024-03-01 10:00:00,10,1,7\n",
                "2,,2024-03-20 10:00:00,20,2,7\n",
            ),
        ),
        ("organizations.csv", "id,name\n10,Acme\n20,Globex\n"),
        ("users.csv", "id,first_name,last_name\n7,Ada,Lovelace\n"),
        ("contacts.csv", "id,company_id,tag_list,job_type_list\n"),
        ("companies.csv", "id,tag_list\n"),
        ("job_types.csv", "id,name\n"),
        ("sectors.csv", "id,name,class\n"),
        ("sector_classes.csv", "id,name\n"),
        ("workforce_brackets.csv", "id,name\n1,1-10\n2,11-50\n"),
        ("sales_brackets.csv", "id,name\n"),
    ];
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap();
    }
}

/// Config pointing at a fresh fixture directory, and an engine over it
pub fn setup() -> (TempDir, Config, MetricsEngine) {
    let dir = tempdir().unwrap();
    write_sources(dir.path());
    let mut config = Config::default();
    config.sources.data_dir = dir.path().to_path_buf();
    let engine = open_dashboard(&config).unwrap().engine();
    (dir, config, engine)
}
