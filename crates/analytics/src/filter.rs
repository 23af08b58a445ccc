//! Filter selection and predicate application
//!
//! A filter is the request-scoped selection the dashboard applies before
//! aggregating: a time range, three id multi-selects (type, organization,
//! user), the bucket granularity and an optional comparison mode. All
//! predicates combine by AND.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enrich::{EnrichedRow, EnrichedTable};
use crate::error::{AnalyticsError, Result};
use crate::timerange::TimeRange;

/// A complete filter for analytics queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Time range for the query
    pub time_range: TimeRange,
    /// Selected type codes
    pub types: BTreeSet<i64>,
    /// Selected organization ids
    pub organizations: BTreeSet<i64>,
    /// Selected user ids
    pub users: BTreeSet<i64>,
    /// Time granularity for bucketed counts
    pub granularity: Granularity,
    /// Comparison mode
    pub compare: Option<CompareMode>,
    /// Meaning of an empty multi-select
    pub empty_selection: EmptySelection,
}

impl Filter {
    /// Create a new filter with a time range
    ///
    /// Defaults to daily buckets and no restriction on types, organizations or users.
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            types: BTreeSet::new(),
            organizations: BTreeSet::new(),
            users: BTreeSet::new(),
            granularity: Granularity::Day,
            compare: None,
            empty_selection: EmptySelection::MatchAll,
        }
    }

    /// Select type codes
    pub fn with_types(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.types.extend(ids);
        self
    }

    /// Select organizations
    pub fn with_organizations(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.organizations.extend(ids);
        self
    }

    /// Select users
    pub fn with_users(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.users.extend(ids);
        self
    }

    /// Set the granularity
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set comparison mode
    pub fn with_compare(mut self, compare: CompareMode) -> Self {
        self.compare = Some(compare);
        self
    }

    /// Set how empty multi-selects behave
    pub fn with_empty_selection(mut self, policy: EmptySelection) -> Self {
        self.empty_selection = policy;
        self
    }

    /// Same selection over another time range
    pub fn with_time_range(&self, time_range: TimeRange) -> Self {
        Self {
            time_range,
            ..self.clone()
        }
    }

    /// Check a single row against every predicate
    pub fn matches(&self, row: &EnrichedRow) -> bool {
        let in_range = row
            .creation_date
            .is_some_and(|ts| self.time_range.contains(ts));

        in_range
            && self.selected(&self.types, row.type_id)
            && self.selected(&self.organizations, row.organization_id)
            && self.selected(&self.users, row.user_id)
    }

    /// Rows matching the filter, in table order
    pub fn apply<'a>(&self, table: &'a EnrichedTable) -> Vec<&'a EnrichedRow> {
        table.iter().filter(|row| self.matches(row)).collect()
    }

    fn selected(&self, selection: &BTreeSet<i64>, value: Option<i64>) -> bool {
        if selection.is_empty() {
            return self.empty_selection == EmptySelection::MatchAll;
        }
        value.is_some_and(|v| selection.contains(&v))
    }
}

/// What an empty multi-select means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelection {
    /// No restriction
    #[default]
    MatchAll,
    /// Nothing is selected, so nothing matches
    MatchNone,
}

/// Time granularity for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Per calendar day
    #[default]
    Day,
    /// Per calendar month
    Month,
}

impl Granularity {
    /// Parse granularity from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" | "jour" | "1d" => Ok(Self::Day),
            "month" | "monthly" | "mois" => Ok(Self::Month),
            _ => Err(AnalyticsError::InvalidGranularity(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
        }
    }

    /// Bucket key of a calendar date (`YYYY-MM-DD` or `YYYY-MM`)
    pub fn key(&self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Month => format!("{:04}-{:02}", date.year(), date.month()),
        }
    }

    /// Bucket key of a timestamp
    pub fn key_of(&self, ts: DateTime<Utc>) -> String {
        self.key(ts.date_naive())
    }
}

/// Comparison mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Compare to previous period of same duration
    Previous,
    /// Compare to same period last year
    PreviousYear,
}

impl CompareMode {
    /// Parse comparison mode from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "previous" | "prev" | "previous_period" => Ok(Self::Previous),
            "previous_year" | "yoy" | "year_over_year" => Ok(Self::PreviousYear),
            _ => Err(AnalyticsError::InvalidCompareMode(s.to_string())),
        }
    }

    /// Range to compare `range` against
    pub fn range_for(&self, range: &TimeRange) -> TimeRange {
        match self {
            Self::Previous => range.previous_period(),
            Self::PreviousYear => range.previous_year(),
        }
    }
}
