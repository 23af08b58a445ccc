//! End-to-end tests: CSV files on disk through the dashboard session

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use conso_analytics::{Dashboard, Dimension, EmptySelection, Filter, Granularity, TimeRange};
use conso_source::{SnapshotLoader, SourcePaths};
use tempfile::tempdir;

const EVENT_HEADER: &str = "id,contact_id,creation_date,organization_id,type_id,user_id\n";

fn write_reference_tables(dir: &Path) {
    let mut organizations = String::from("id,name\n");
    for id in 1..=15 {
        organizations.push_str(&format!("{},Org {}\n", id, id));
    }

    let files = [
        ("organizations.csv", organizations.as_str()),
        ("users.csv", "id,first_name,last_name\n7,Ada,Lovelace\n8,Alan,Turing\n"),
        (
            "contacts.csv",
            concat!(
                "id,company_id,tag_list,job_type_list\n",
                "100,500,\"[{\"\"name\"\":\"\"Niveau\"\",\"\"list\"\":[{\"\"id\"\":2,\"\"name\"\":\"\"Direction\"\"}]}]\",\"[{\"\"id\"\":3}]\"\n",
                "101,501,,[]\n",
                "102,502,not json,\"[{\"\"id\"\":4}]\"\n",
            ),
        ),
        (
            "companies.csv",
            concat!(
                "id,tag_list\n",
                "500,\"[{\"\"name\"\":\"\"Secteur\"\",\"\"list\"\":[{\"\"id\"\":5}]}]\"\n",
                "501,\"[{\"\"name\"\":\"\"Tranche de CA\"\",\"\"list\"\":[{\"\"id\"\":1}]}]\"\n",
                "502,{broken\n",
            ),
        ),
        ("job_types.csv", "id,name\n3,Engineer\n4,Sales\n"),
        ("sectors.csv", "id,name,class\n5,Retail,1\n"),
        ("sector_classes.csv", "id,name\n1,Commerce\n"),
        ("workforce_brackets.csv", "id,name\n1,1-10\n"),
        ("sales_brackets.csv", "id,name\n1,<1M\n"),
    ];
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap();
    }
}

fn write_events(dir: &Path, rows: &[String]) {
    let mut contents = String::from(EVENT_HEADER);
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    fs::write(dir.join("consumption_histories.csv"), contents).unwrap();
}

fn open(dir: &Path) -> Dashboard {
    Dashboard::open(SnapshotLoader::new(SourcePaths::in_dir(dir))).unwrap()
}

fn january(from: u32, to: u32) -> TimeRange {
    TimeRange::parse_at(
        &format!("2024-01-{:02},2024-01-{:02}", from, to),
        chrono::Utc::now(),
    )
    .unwrap()
}

#[test]
fn test_day_buckets_example() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());
    write_events(
        dir.path(),
        &[
            "1,,2024-01-01 00:00:00,10,1,7".to_string(),
            "2,,2024-01-01 00:00:00,10,1,7".to_string(),
            "3,,2024-01-02 00:00:00,20,2,8".to_string(),
        ],
    );

    let engine = open(dir.path()).engine();
    let filter = Filter::new(january(1, 2)).with_types([1]);

    assert_eq!(
        engine.volume(&filter).pairs(),
        vec![("2024-01-01", 2), ("2024-01-02", 0)]
    );
}

#[test]
fn test_enrichment_keeps_every_event() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());
    write_events(
        dir.path(),
        &[
            "1,100,2024-01-03 10:00:00,1,1,7".to_string(),
            "2,101,2024-01-03 11:00:00,1,1,7".to_string(),
            "3,102,2024-01-04 09:30:00,2,1,8".to_string(),
            "4,999,2024-01-04 09:30:00,2,1,8".to_string(),
            "5,,not a date,2,1,8".to_string(),
        ],
    );

    let dashboard = open(dir.path());
    let state = dashboard.state();
    let table = state.table();

    assert_eq!(table.len(), 5);
    assert_eq!(state.load_stats().unparsed_dates, 1);

    let first = &table.rows()[0];
    assert_eq!(first.contact.job_type_id, Some(3));
    assert_eq!(first.contact.hierarchical_name.as_deref(), Some("Direction"));
    assert_eq!(first.company.sector, Some(5));
    assert_eq!(first.sector_class, Some(1));

    let malformed = &table.rows()[2];
    assert_eq!(malformed.contact.job_type_id, Some(4));
    assert!(malformed.company.is_empty());

    let stats = state.enrich_stats();
    assert_eq!(stats.unmatched_contacts, 1);
    assert_eq!(stats.malformed_contact_tags, 1);
    assert_eq!(stats.malformed_company_tags, 1);
}

#[test]
fn test_breakdowns_resolve_catalogs() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());
    write_events(
        dir.path(),
        &[
            "1,100,2024-01-03,1,1,7".to_string(),
            "2,100,2024-01-03,1,1,7".to_string(),
            "3,101,2024-01-03,1,1,7".to_string(),
            "4,102,2024-01-03,1,1,8".to_string(),
        ],
    );

    let engine = open(dir.path()).engine();
    let filter = Filter::new(january(1, 31));

    let jobs = engine.breakdown_with_rates(&filter, Dimension::JobType);
    assert_eq!(
        jobs.pairs(),
        vec![("Engineer", 2), ("Unknown", 1), ("Sales", 1)]
    );
    let rate_sum: f64 = jobs.rows.iter().filter_map(|r| r.rate).sum();
    assert!((rate_sum - 100.0).abs() < 0.05);

    let classes = engine.breakdown(&filter, Dimension::SectorClass);
    assert_eq!(classes.pairs(), vec![("Commerce", 2), ("Unknown", 2)]);

    let revenue = engine.breakdown(&filter, Dimension::RevenueBracket);
    assert_eq!(revenue.pairs(), vec![("Unknown", 3), ("<1M", 1)]);

    let users = engine.breakdown(&filter, Dimension::User);
    assert_eq!(users.pairs(), vec![("Ada Lovelace", 3), ("Alan Turing", 1)]);
}

#[test]
fn test_top_ten_of_fifteen_organizations() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());

    let mut rows = Vec::new();
    let mut id = 0;
    for org in 1..=15 {
        for _ in 0..org {
            id += 1;
            rows.push(format!("{},,2024-01-10 12:00:00,{},1,7", id, org));
        }
    }
    write_events(dir.path(), &rows);

    let engine = open(dir.path()).engine();
    let top = engine.top_organizations(&Filter::new(january(1, 31)));

    assert_eq!(top.len(), 10);
    assert_eq!(top.rows[0].label, "Org 15");
    assert!(top.rows.windows(2).all(|w| w[0].count > w[1].count));
}

#[test]
fn test_default_range_and_month_buckets() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());
    write_events(
        dir.path(),
        &[
            "1,,2024-01-20 08:00:00,1,1,7".to_string(),
            "2,,2024-02-15 08:00:00,1,1,7".to_string(),
            "3,,2024-02-20 16:00:00,1,2,7".to_string(),
        ],
    );

    let engine = open(dir.path()).engine();
    let range = engine.table().default_range(31).unwrap();
    assert_eq!(range.start.date_naive().to_string(), "2024-01-20");
    assert_eq!(range.end.date_naive().to_string(), "2024-02-20");

    // the end bound is midnight, so the 16:00 event on the last day is out
    let filter = Filter::new(range).with_granularity(Granularity::Month);
    assert_eq!(
        engine.volume(&filter).pairs(),
        vec![("2024-01", 1), ("2024-02", 1)]
    );

    let strict = filter.with_types([1]).with_empty_selection(EmptySelection::MatchNone);
    assert_eq!(engine.row_count(&strict), 0);
}

#[test]
fn test_state_rebuilt_when_sources_change() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());
    write_events(dir.path(), &["1,,2024-01-01,1,1,7".to_string()]);

    let dashboard = open(dir.path());
    let before = dashboard.state();
    assert_eq!(before.table().len(), 1);

    // same files, same state
    assert!(Arc::ptr_eq(&before, &dashboard.state()));

    write_events(
        dir.path(),
        &[
            "1,,2024-01-01,1,1,7".to_string(),
            "2,,2024-01-02,1,1,7".to_string(),
        ],
    );
    let after = dashboard.state();
    assert_eq!(after.table().len(), 2);
    assert_ne!(before.fingerprint(), after.fingerprint());

    let refreshed = dashboard.refresh().unwrap();
    assert_eq!(refreshed.table().len(), 2);
}

fn rewrite_with_mtime(path: &Path, contents: &str, modified: SystemTime) {
    fs::write(path, contents).unwrap();
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

#[test]
fn test_failed_reload_not_retried_until_sources_change() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());
    write_events(dir.path(), &["1,,2024-01-01,1,1,7".to_string()]);
    let dashboard = open(dir.path());
    let before = dashboard.state();

    let contacts = dir.path().join("contacts.csv");
    let original = fs::read_to_string(&contacts).unwrap();
    let stamp = fs::metadata(&contacts).unwrap().modified().unwrap() + Duration::from_secs(10);

    // same length, required column renamed
    let broken = original.replacen("company_id", "company_xx", 1);
    rewrite_with_mtime(&contacts, &broken, stamp);
    assert!(Arc::ptr_eq(&before, &dashboard.state()));

    // readable again but indistinguishable from the failed attempt
    rewrite_with_mtime(&contacts, &original, stamp);
    assert!(Arc::ptr_eq(&before, &dashboard.state()));

    let refreshed = dashboard.refresh().unwrap();
    assert!(!Arc::ptr_eq(&before, &refreshed));
    assert!(Arc::ptr_eq(&refreshed, &dashboard.state()));

    rewrite_with_mtime(&contacts, &original, stamp + Duration::from_secs(10));
    let rebuilt = dashboard.state();
    assert!(!Arc::ptr_eq(&refreshed, &rebuilt));
    assert_eq!(rebuilt.table().len(), 1);
}

#[test]
fn test_missing_reference_file_is_fatal() {
    let dir = tempdir().unwrap();
    write_reference_tables(dir.path());
    write_events(dir.path(), &["1,,2024-01-01,1,1,7".to_string()]);
    fs::remove_file(dir.path().join("sectors.csv")).unwrap();

    assert!(Dashboard::open(SnapshotLoader::new(SourcePaths::in_dir(dir.path()))).is_err());
}
