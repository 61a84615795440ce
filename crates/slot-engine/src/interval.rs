//! Half-open UTC intervals and the timestamp parsing shared by the feeds.
//!
//! Every comparison in the engine happens on `DateTime<Utc>` values. Feed
//! timestamps are parsed here once; nothing downstream ever sees a string.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::error::{Result, SlotError};

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range, rejecting empty or inverted intervals.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(SlotError::FeedFormat(format!(
                "range end {} is not after start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// `start <= instant < end`. An instant equal to `end` is outside.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Two ranges overlap iff `a.start < b.end && b.start < a.end`.
    /// Adjacent ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// True when any range in `ranges` contains `instant`.
pub fn any_contains<'a, I>(ranges: I, instant: DateTime<Utc>) -> bool
where
    I: IntoIterator<Item = &'a TimeRange>,
{
    ranges.into_iter().any(|r| r.contains(instant))
}

/// Parse an ISO 8601 timestamp into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (with offset or `Z`), minute precision with an offset,
/// naive `YYYY-MM-DDTHH:MM[:SS]` with or without a trailing `Z`, and a bare
/// `YYYY-MM-DD`. Anything without an offset is read as UTC; a bare date is
/// UTC midnight.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s.strip_suffix('Z').unwrap_or(s);
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .map(|date| at_utc(date, NaiveTime::MIN))
        .map_err(|_| SlotError::FeedFormat(format!("invalid timestamp '{}'", s)))
}

/// Parse a time of day written as `H:MM` or `HH:MM`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| SlotError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Parse a calendar date written as `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| SlotError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Combine a calendar date with a time of day into a UTC instant.
pub fn at_utc(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

