//! Tests for the metrics engine

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use conso_source::{Catalog, CatalogKind, Catalogs};

use crate::breakdown::Dimension;
use crate::enrich::{EnrichedRow, EnrichedTable};
use crate::filter::{CompareMode, EmptySelection, Filter, Granularity};
use crate::metrics::MetricsEngine;
use crate::tags::ContactAttributes;
use crate::timerange::TimeRange;

fn event(id: i64, type_id: i64, org: i64, (y, m, d): (i32, u32, u32)) -> EnrichedRow {
    EnrichedRow {
        id: Some(id),
        type_id: Some(type_id),
        organization_id: Some(org),
        creation_date: Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
        ..EnrichedRow::default()
    }
}

fn range(from: (i32, u32, u32), to: (i32, u32, u32)) -> TimeRange {
    let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    TimeRange::from_dates(date(from), date(to)).unwrap()
}

fn engine(rows: Vec<EnrichedRow>) -> MetricsEngine {
    let catalogs = Catalogs {
        organizations: Catalog::from_pairs(
            CatalogKind::Organizations,
            [(Some(10), Some("Acme")), (Some(20), Some("Globex"))],
        ),
        ..Catalogs::default()
    };
    MetricsEngine::new(Arc::new(rows.into_iter().collect::<EnrichedTable>()), Arc::new(catalogs))
}

#[test]
fn test_volume_example_scenario() {
    let engine = engine(vec![
        event(1, 1, 10, (2024, 1, 1)),
        event(2, 1, 10, (2024, 1, 1)),
        event(3, 2, 20, (2024, 1, 2)),
    ]);
    let filter = Filter::new(range((2024, 1, 1), (2024, 1, 2))).with_types([1]);

    let volume = engine.volume(&filter);
    assert_eq!(volume.pairs(), vec![("2024-01-01", 2), ("2024-01-02", 0)]);
    assert_eq!(volume.total as usize, engine.row_count(&filter));
}

#[test]
fn test_volume_sum_matches_filtered_rows() {
    let rows: Vec<_> = (0..90)
        .map(|i| {
            let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i);
            EnrichedRow {
                id: Some(i),
                type_id: Some(i % 3),
                creation_date: Some(day.and_hms_opt(12, 0, 0).unwrap().and_utc()),
                ..EnrichedRow::default()
            }
        })
        .collect();
    let engine = engine(rows);

    let filter = Filter::new(range((2024, 1, 10), (2024, 3, 5))).with_types([0, 2]);
    let daily = engine.volume(&filter);
    assert_eq!(daily.len(), 56);
    assert_eq!(daily.total as usize, engine.row_count(&filter));

    let monthly = engine.volume(&filter.clone().with_granularity(Granularity::Month));
    assert_eq!(monthly.len(), 3);
    assert_eq!(monthly.total, daily.total);
}

#[test]
fn test_volume_with_comparison() {
    let engine = engine(vec![
        event(1, 1, 10, (2024, 1, 5)),
        event(2, 1, 10, (2024, 1, 12)),
        event(3, 1, 10, (2024, 1, 13)),
        event(4, 1, 10, (2024, 1, 14)),
    ]);
    let filter = Filter::new(range((2024, 1, 11), (2024, 1, 17))).with_compare(CompareMode::Previous);

    let volume = engine.volume_with_comparison(&filter);
    let comparison = volume.comparison.unwrap();
    assert_eq!(volume.total, 3);
    assert_eq!(comparison.previous_total, 1);
    assert_eq!(comparison.change, 2);
    assert_eq!(comparison.percent_change, 200.0);
    assert_eq!(comparison.previous_points.map(|p| p.len()), Some(7));
}

#[test]
fn test_volume_without_compare_mode() {
    let engine = engine(vec![event(1, 1, 10, (2024, 1, 5))]);
    let filter = Filter::new(range((2024, 1, 1), (2024, 1, 7)));
    assert!(engine.volume_with_comparison(&filter).comparison.is_none());
}

#[test]
fn test_breakdown_by_organization() {
    let engine = engine(vec![
        event(1, 1, 20, (2024, 1, 1)),
        event(2, 1, 10, (2024, 1, 1)),
        event(3, 1, 20, (2024, 1, 1)),
        event(4, 1, 30, (2024, 1, 1)),
    ]);
    let filter = Filter::new(range((2024, 1, 1), (2024, 1, 1)));

    let breakdown = engine.breakdown_with_rates(&filter, Dimension::Organization);
    assert_eq!(
        breakdown.pairs(),
        vec![("Globex", 2), ("Acme", 1), ("Unknown", 1)]
    );
    let rates: Vec<_> = breakdown.rows.iter().filter_map(|r| r.rate).collect();
    assert_eq!(rates, vec![50.0, 25.0, 25.0]);

    let unknown = breakdown.unknown().unwrap();
    assert_eq!(unknown.code, None);
    assert_eq!(unknown.count, 1);
}

#[test]
fn test_unknown_job_type_counted() {
    let mut with_job = event(1, 1, 10, (2024, 1, 1));
    with_job.contact = ContactAttributes {
        job_type_id: Some(3),
        ..ContactAttributes::default()
    };
    let without_job = event(2, 1, 10, (2024, 1, 1));
    let engine = engine(vec![with_job, without_job.clone(), without_job]);

    let filter = Filter::new(range((2024, 1, 1), (2024, 1, 1)));
    let breakdown = engine.breakdown(&filter, Dimension::JobType);

    // job type 3 is not in the (empty) job type catalog either
    assert_eq!(breakdown.pairs(), vec![("Unknown", 3)]);
    assert_eq!(breakdown.unknown().map(|r| r.count), Some(3));

    let by_org = engine.breakdown(&filter, Dimension::Organization);
    assert!(by_org.unknown().is_none());
}

#[test]
fn test_type_breakdown_labels_raw_codes() {
    let engine = engine(vec![
        event(1, 4, 10, (2024, 1, 1)),
        event(2, 4, 10, (2024, 1, 1)),
        event(3, 7, 10, (2024, 1, 1)),
    ]);
    let filter = Filter::new(range((2024, 1, 1), (2024, 1, 1)));
    assert_eq!(
        engine.breakdown(&filter, Dimension::Type).pairs(),
        vec![("4", 2), ("7", 1)]
    );
}

#[test]
fn test_top_organizations_uses_limit() {
    let engine = engine(vec![
        event(1, 1, 10, (2024, 1, 1)),
        event(2, 1, 20, (2024, 1, 1)),
        event(3, 1, 20, (2024, 1, 1)),
    ])
    .with_top_limit(1);
    let filter = Filter::new(range((2024, 1, 1), (2024, 1, 1)));

    let top = engine.top_organizations(&filter);
    assert_eq!(top.pairs(), vec![("Globex", 2)]);
    assert_eq!(top.total, 3);
}

#[test]
fn test_match_none_empties_every_metric() {
    let engine = engine(vec![event(1, 1, 10, (2024, 1, 1))]);
    let filter = Filter::new(range((2024, 1, 1), (2024, 1, 2)))
        .with_empty_selection(EmptySelection::MatchNone);

    assert_eq!(engine.row_count(&filter), 0);
    assert_eq!(engine.volume(&filter).pairs(), vec![("2024-01-01", 0), ("2024-01-02", 0)]);
    assert!(engine.breakdown(&filter, Dimension::Organization).is_empty());
}
