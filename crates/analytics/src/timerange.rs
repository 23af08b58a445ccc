//! Time range parsing and calendar bucketing
//!
//! A range is inclusive at both ends and compared at full timestamp
//! precision. Ranges built from calendar dates use midnight for both
//! boundaries, so an end date of `2024-01-31` stops at `2024-01-31 00:00:00`.
//!
//! Relative ranges (`31d`, `3m`, `ytd`) are anchored on a caller-supplied
//! timestamp, normally the latest event of the log, rather than on the wall
//! clock: the event log is a static export.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{AnalyticsError, Result};
use crate::filter::Granularity;

/// A time range for analytics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    /// Start of the range (inclusive)
    pub start: DateTime<Utc>,
    /// End of the range (inclusive)
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(AnalyticsError::InvalidTimeRange(
                "end must be after start".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Range between two calendar dates, both at midnight
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(midnight(start), midnight(end))
    }

    /// Parse a range anchored on `anchor`
    ///
    /// Supported formats:
    /// - Custom: `2024-01-01,2024-01-31`
    /// - Relative: `7d`, `2w`, `3m`, `1y` (calendar days/months ending on the anchor day)
    /// - Predefined: `mtd`, `ytd`
    pub fn parse_at(s: &str, anchor: DateTime<Utc>) -> Result<Self> {
        let s = s.trim().to_lowercase();

        if let Some(range) = Self::parse_custom(&s)? {
            return Ok(range);
        }

        let anchor_day = anchor.date_naive();
        match s.as_str() {
            "mtd" => return Self::from_dates(first_of_month(anchor_day), anchor_day),
            "ytd" => {
                let jan_first = NaiveDate::from_ymd_opt(anchor_day.year(), 1, 1).unwrap_or(anchor_day);
                return Self::from_dates(jan_first, anchor_day);
            }
            _ => {}
        }

        if let Some((num, unit)) = extract_num_unit(&s) {
            let start = match unit {
                'd' => days_back(anchor_day, num),
                'w' => num.checked_mul(7).and_then(|days| days_back(anchor_day, days)),
                'm' => months_back(anchor_day, num),
                'y' => num
                    .checked_mul(12)
                    .and_then(|months| months_back(anchor_day, months)),
                _ => {
                    return Err(AnalyticsError::InvalidTimeRange(format!(
                        "unknown unit '{}' in {}",
                        unit, s
                    )));
                }
            };
            let start = start.ok_or_else(|| {
                AnalyticsError::InvalidTimeRange(format!("range out of bounds: {}", s))
            })?;
            return Self::from_dates(start, anchor_day);
        }

        Err(AnalyticsError::InvalidTimeRange(format!(
            "unknown time range format: {}",
            s
        )))
    }

    /// Get the previous period of the same duration
    pub fn previous_period(&self) -> Self {
        let duration = self.end - self.start;
        Self {
            start: self.start - duration - Duration::seconds(1),
            end: self.start - Duration::seconds(1),
        }
    }

    /// Get the same period from the previous year
    pub fn previous_year(&self) -> Self {
        Self {
            start: shift_year(self.start, -1),
            end: shift_year(self.end, -1),
        }
    }

    /// Get the duration of this range
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check whether a timestamp falls inside the range
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Calendar days touched by the range, in order
    pub fn calendar_days(&self) -> Vec<NaiveDate> {
        let last = self.end.date_naive();
        self.start
            .date_naive()
            .iter_days()
            .take_while(|d| *d <= last)
            .collect()
    }

    /// First day of every calendar month touched by the range, in order
    pub fn calendar_months(&self) -> Vec<NaiveDate> {
        let last = first_of_month(self.end.date_naive());
        let mut next = Some(first_of_month(self.start.date_naive()));
        let mut months = Vec::new();
        while let Some(month) = next.filter(|m| *m <= last) {
            months.push(month);
            next = shift_months(month, 1);
        }
        months
    }

    /// Every expected bucket key, chronologically
    pub fn bucket_keys(&self, granularity: Granularity) -> Vec<String> {
        let periods = match granularity {
            Granularity::Day => self.calendar_days(),
            Granularity::Month => self.calendar_months(),
        };
        periods.into_iter().map(|d| granularity.key(d)).collect()
    }

    /// `YYYY-MM-DD` keys for every day in the range
    pub fn day_keys(&self) -> Vec<String> {
        self.bucket_keys(Granularity::Day)
    }

    /// `YYYY-MM` keys for every month overlapping the range
    pub fn month_keys(&self) -> Vec<String> {
        self.bucket_keys(Granularity::Month)
    }
}

impl TimeRange {
    fn parse_custom(s: &str) -> Result<Option<Self>> {
        // Format: 2024-01-01,2024-01-31
        let Some((start, end)) = s.split_once(',') else {
            return Ok(None);
        };

        let start_date = parse_date(start.trim())?;
        let end_date = parse_date(end.trim())?;

        Self::from_dates(start_date, end_date).map(Some)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        AnalyticsError::InvalidTimeRange(format!("invalid date format: {} (use YYYY-MM-DD)", s))
    })
}

fn extract_num_unit(s: &str) -> Option<(i64, char)> {
    let unit = s.chars().last()?;
    if !unit.is_ascii_alphabetic() {
        return None;
    }

    let num: i64 = s[..s.len() - 1].parse().ok()?;
    if num <= 0 {
        return None;
    }

    Some((num, unit))
}

/// First day of the `days`-long window ending on `day`
fn days_back(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    let span = u64::try_from(days.checked_sub(1)?).ok()?;
    day.checked_sub_days(Days::new(span))
}

/// Day after `day` moved back by `months`
fn months_back(day: NaiveDate, months: i64) -> Option<NaiveDate> {
    let months = i32::try_from(months).ok()?.checked_neg()?;
    shift_months(day, months)?.succ_opt()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn shift_year(dt: DateTime<Utc>, years: i32) -> DateTime<Utc> {
    let date = dt.date_naive();
    // Feb 29 lands on Feb 28 in a common year
    date.with_year(date.year() + years)
        .or_else(|| date.pred_opt().and_then(|d| d.with_year(d.year() + years)))
        .map(|d| d.and_time(dt.time()).and_utc())
        .unwrap_or(dt)
}

/// Shift a date by a number of months (positive or negative)
///
/// If the target day doesn't exist (e.g., Mar 31 - 1 month), uses the last
/// day of the target month. `None` when the result leaves chrono's range.
fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let total = (date.year() * 12 + date.month0() as i32).checked_add(months)?;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 1).and_then(last_day_of_month))
}

/// Get the last day of the month for a given date
fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = (date.year(), date.month());
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month.and_then(|d| d.pred_opt())
}
