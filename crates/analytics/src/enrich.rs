//! Enrichment joiner
//!
//! Left-joins the event log against decoded contact attributes, decoded
//! company attributes and the sector classification. Reference keys are
//! deduplicated by first occurrence before the join, so the output always
//! holds exactly one row per event, in event order.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Days, Utc};
use conso_source::{CompanyRecord, ContactRecord, Event, SectorCatalog, Snapshot};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AnalyticsError, Result};
use crate::tags::{CompanyAttributes, ContactAttributes};
use crate::timerange::TimeRange;

/// One event with its contact, company and sector attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichedRow {
    pub id: Option<i64>,
    pub creation_date: Option<DateTime<Utc>>,
    pub organization_id: Option<i64>,
    pub user_id: Option<i64>,
    pub contact_id: Option<i64>,
    pub type_id: Option<i64>,
    /// Company of the matched contact
    pub company_id: Option<i64>,
    #[serde(flatten)]
    pub contact: ContactAttributes,
    #[serde(flatten)]
    pub company: CompanyAttributes,
    /// Parent class of the company's sector
    pub sector_class: Option<i64>,
}

impl EnrichedRow {
    /// Row for an event with every enrichment field null
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id,
            creation_date: event.creation_date,
            organization_id: event.organization_id,
            user_id: event.user_id,
            contact_id: event.contact_id,
            type_id: event.type_id,
            ..Self::default()
        }
    }
}

/// Counters collected while joining
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    /// Events whose contact id has no contact row
    pub unmatched_contacts: usize,
    /// Matched contacts whose company id has no company row
    pub unmatched_companies: usize,
    /// Contact rows with undecodable tag or job-type text
    pub malformed_contact_tags: usize,
    /// Company rows with undecodable tag text
    pub malformed_company_tags: usize,
    /// Contact rows ignored because their id was already seen
    pub duplicate_contacts: usize,
    /// Company rows ignored because their id was already seen
    pub duplicate_companies: usize,
}

/// The denormalized analytic table, built once per snapshot
#[derive(Debug, Clone, Default)]
pub struct EnrichedTable {
    rows: Vec<EnrichedRow>,
    stats: EnrichStats,
}

struct ContactJoin {
    company_id: Option<i64>,
    attrs: ContactAttributes,
}

impl EnrichedTable {
    /// Join a snapshot's events against its reference tables
    pub fn build(snapshot: &Snapshot) -> Self {
        Self::join(
            &snapshot.events,
            &snapshot.contacts,
            &snapshot.companies,
            &snapshot.catalogs.sectors,
        )
    }

    /// Join events against contacts, companies and sectors
    pub fn join(
        events: &[Event],
        contacts: &[ContactRecord],
        companies: &[CompanyRecord],
        sectors: &SectorCatalog,
    ) -> Self {
        let mut stats = EnrichStats::default();
        let contacts = index_contacts(contacts, &mut stats);
        let companies = index_companies(companies, &mut stats);

        let rows = events
            .iter()
            .map(|event| {
                let mut row = EnrichedRow::from_event(event);

                let Some(contact_id) = event.contact_id else {
                    return row;
                };
                let Some(contact) = contacts.get(&contact_id) else {
                    stats.unmatched_contacts += 1;
                    return row;
                };
                row.company_id = contact.company_id;
                row.contact = contact.attrs.clone();

                if let Some(company_id) = contact.company_id {
                    match companies.get(&company_id) {
                        Some(company) => row.company = *company,
                        None => stats.unmatched_companies += 1,
                    }
                }
                row.sector_class = row.company.sector.and_then(|s| sectors.class_of(s));
                row
            })
            .collect::<Vec<_>>();

        if stats.malformed_contact_tags > 0 || stats.malformed_company_tags > 0 {
            warn!(
                contacts = stats.malformed_contact_tags,
                companies = stats.malformed_company_tags,
                "malformed tag text decoded as empty attributes"
            );
        }
        if stats.duplicate_contacts > 0 || stats.duplicate_companies > 0 {
            warn!(
                contacts = stats.duplicate_contacts,
                companies = stats.duplicate_companies,
                "duplicate reference keys ignored, first occurrence kept"
            );
        }
        debug!(
            rows = rows.len(),
            unmatched_contacts = stats.unmatched_contacts,
            unmatched_companies = stats.unmatched_companies,
            "enriched table built"
        );

        Self { rows, stats }
    }

    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> EnrichStats {
        self.stats
    }

    /// Distinct type codes present in the log, ascending
    pub fn type_ids(&self) -> Vec<i64> {
        self.rows
            .iter()
            .filter_map(|r| r.type_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest event timestamp
    pub fn earliest_creation_date(&self) -> Option<DateTime<Utc>> {
        self.rows.iter().filter_map(|r| r.creation_date).min()
    }

    /// Latest event timestamp
    pub fn latest_creation_date(&self) -> Option<DateTime<Utc>> {
        self.rows.iter().filter_map(|r| r.creation_date).max()
    }

    /// Default window: from `days` before the latest event to the latest event's day
    pub fn default_range(&self, days: u32) -> Result<TimeRange> {
        let latest = self
            .latest_creation_date()
            .ok_or(AnalyticsError::NoDatedEvents)?;
        let end = latest.date_naive();
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                AnalyticsError::InvalidTimeRange(format!("{} day window out of bounds", days))
            })?;
        TimeRange::from_dates(start, end)
    }
}

impl FromIterator<EnrichedRow> for EnrichedTable {
    fn from_iter<I: IntoIterator<Item = EnrichedRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
            stats: EnrichStats::default(),
        }
    }
}

impl<'a> IntoIterator for &'a EnrichedTable {
    type Item = &'a EnrichedRow;
    type IntoIter = std::slice::Iter<'a, EnrichedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn index_contacts(contacts: &[ContactRecord], stats: &mut EnrichStats) -> HashMap<i64, ContactJoin> {
    let mut index = HashMap::with_capacity(contacts.len());
    for contact in contacts {
        let Some(id) = contact.id else { continue };
        if index.contains_key(&id) {
            stats.duplicate_contacts += 1;
            continue;
        }
        let (attrs, errors) = ContactAttributes::extract_with_errors(
            contact.tag_list.as_deref(),
            contact.job_type_list.as_deref(),
        );
        if let Some(err) = errors.first() {
            stats.malformed_contact_tags += 1;
            debug!(contact_id = id, error = %err, "contact tags not decodable");
        }
        index.insert(
            id,
            ContactJoin {
                company_id: contact.company_id,
                attrs,
            },
        );
    }
    index
}

fn index_companies(
    companies: &[CompanyRecord],
    stats: &mut EnrichStats,
) -> HashMap<i64, CompanyAttributes> {
    let mut index = HashMap::with_capacity(companies.len());
    for company in companies {
        let Some(id) = company.id else { continue };
        if index.contains_key(&id) {
            stats.duplicate_companies += 1;
            continue;
        }
        let attrs = match CompanyAttributes::try_extract(company.tag_list.as_deref()) {
            Ok(attrs) => attrs,
            Err(err) => {
                stats.malformed_company_tags += 1;
                debug!(company_id = id, error = %err, "company tags not decodable");
                CompanyAttributes::default()
            }
        };
        index.insert(id, attrs);
    }
    index
}
