//! Typed rows of the event log and the semi-structured reference tables

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::parse::{clean_text, parse_id_cell, parse_timestamp};
use crate::table::Table;

/// Columns the event log must provide
pub const EVENT_COLUMNS: &[&str] = &[
    "id",
    "contact_id",
    "creation_date",
    "organization_id",
    "type_id",
    "user_id",
];

/// Columns the contacts table must provide
pub const CONTACT_COLUMNS: &[&str] = &["id", "company_id", "tag_list", "job_type_list"];

/// Columns the companies table must provide
pub const COMPANY_COLUMNS: &[&str] = &["id", "tag_list"];

/// One consumption record
///
/// Identifiers are optional: a cell that cannot be parsed becomes `None`
/// rather than dropping the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: Option<i64>,
    pub creation_date: Option<DateTime<Utc>>,
    pub organization_id: Option<i64>,
    pub user_id: Option<i64>,
    pub contact_id: Option<i64>,
    pub type_id: Option<i64>,
}

impl Event {
    /// Read every event of a table, preserving file order
    ///
    /// Returns the events and the number of rows whose `creation_date`
    /// could not be parsed.
    pub fn from_table(table: &Table) -> Result<(Vec<Self>, usize)> {
        table.require(EVENT_COLUMNS)?;

        let ids = table.text("id")?;
        let dates = table.text("creation_date")?;
        let orgs = table.text("organization_id")?;
        let users = table.text("user_id")?;
        let contacts = table.text("contact_id")?;
        let types = table.text("type_id")?;

        let mut bad_dates = 0;
        let mut events = Vec::with_capacity(table.height());

        for i in 0..table.height() {
            let creation_date = clean_text(dates[i].as_deref()).and_then(parse_timestamp);
            if creation_date.is_none() {
                bad_dates += 1;
            }

            events.push(Self {
                id: parse_id_cell(ids[i].as_deref()),
                creation_date,
                organization_id: parse_id_cell(orgs[i].as_deref()),
                user_id: parse_id_cell(users[i].as_deref()),
                contact_id: parse_id_cell(contacts[i].as_deref()),
                type_id: parse_id_cell(types[i].as_deref()),
            });
        }

        Ok((events, bad_dates))
    }
}

/// Contact row with its tag lists still serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub id: Option<i64>,
    pub company_id: Option<i64>,
    /// Hierarchical category tags
    pub tag_list: Option<String>,
    /// Job-type tags; the first entry is the contact's primary job type
    pub job_type_list: Option<String>,
}

impl ContactRecord {
    /// Read every contact of a table
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        table.require(CONTACT_COLUMNS)?;

        let ids = table.text("id")?;
        let companies = table.text("company_id")?;
        let tags = table.text("tag_list")?;
        let job_types = table.text("job_type_list")?;

        Ok((0..table.height())
            .map(|i| Self {
                id: parse_id_cell(ids[i].as_deref()),
                company_id: parse_id_cell(companies[i].as_deref()),
                tag_list: owned_text(&tags[i]),
                job_type_list: owned_text(&job_types[i]),
            })
            .collect())
    }
}

/// Company row with its category tags still serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub id: Option<i64>,
    pub tag_list: Option<String>,
}

impl CompanyRecord {
    /// Read every company of a table
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        table.require(COMPANY_COLUMNS)?;

        let ids = table.text("id")?;
        let tags = table.text("tag_list")?;

        Ok((0..table.height())
            .map(|i| Self {
                id: parse_id_cell(ids[i].as_deref()),
                tag_list: owned_text(&tags[i]),
            })
            .collect())
    }
}

fn owned_text(value: &Option<String>) -> Option<String> {
    clean_text(value.as_deref()).map(str::to_string)
}
