//! Parsing of the two remote feeds: calendar rules and appointments.
//!
//! A body that is not the expected JSON shape is an error and the caller keeps
//! its previous snapshot. Individual entries that fail to parse are skipped
//! with a warning so one bad record cannot hide the rest of the feed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SlotError};
use crate::interval::{parse_timestamp, TimeRange};

/// Whether an exception range closes or opens the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    Blackout,
    Open,
}

/// A blackout or override interval layered over the availability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExceptionRange {
    pub kind: ExceptionKind,
    pub range: TimeRange,
}

/// Blackouts and open exceptions per specialty, plus the blackout message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarRules {
    pub blackouts: BTreeMap<u32, Vec<ExceptionRange>>,
    pub open_exceptions: BTreeMap<u32, Vec<ExceptionRange>>,
    pub holidays_message: String,
}

/// An existing booking for one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookedInterval {
    pub room_id: u32,
    pub range: TimeRange,
}

/// Every known booking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Appointments {
    pub bookings: Vec<BookedInterval>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRules {
    #[serde(default)]
    holidays: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    open_exceptions: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    holidays_message: Option<String>,
}

#[derive(Deserialize)]
struct RawRange {
    #[serde(rename = "DataInicio")]
    start: String,
    #[serde(rename = "DataFim")]
    end: String,
}

#[derive(Deserialize)]
struct RawAppointment {
    #[serde(rename = "IdGabinete")]
    room_id: u32,
    #[serde(rename = "DataInicio")]
    start: String,
    #[serde(rename = "DataFim")]
    end: String,
}

impl CalendarRules {
    /// Parse the `calendar-rules.json` body.
    ///
    /// # Errors
    /// Returns `SlotError::FeedFormat` if the body is not a JSON object of the
    /// expected shape. Malformed specialty keys and ranges are skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawRules = serde_json::from_str(json)
            .map_err(|e| SlotError::FeedFormat(format!("calendar rules: {}", e)))?;

        Ok(Self {
            blackouts: convert_ranges(raw.holidays.unwrap_or_default(), ExceptionKind::Blackout),
            open_exceptions: convert_ranges(
                raw.open_exceptions.unwrap_or_default(),
                ExceptionKind::Open,
            ),
            holidays_message: raw.holidays_message.unwrap_or_default(),
        })
    }

    /// Blackout ranges for a specialty.
    pub fn blackouts_for(&self, specialty: u32) -> &[ExceptionRange] {
        self.blackouts.get(&specialty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Open-exception ranges for a specialty.
    pub fn open_exceptions_for(&self, specialty: u32) -> &[ExceptionRange] {
        self.open_exceptions
            .get(&specialty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Appointments {
    /// Parse the `appointments.json` body.
    ///
    /// # Errors
    /// Returns `SlotError::FeedFormat` if the body is not a JSON array.
    /// Malformed records are skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<Value> = serde_json::from_str(json)
            .map_err(|e| SlotError::FeedFormat(format!("appointments: {}", e)))?;

        let bookings = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match convert_appointment(value) {
                Ok(booking) => Some(booking),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed appointment");
                    None
                }
            })
            .collect();

        Ok(Self { bookings })
    }

    /// Booked ranges for one room.
    pub fn for_room(&self, room_id: u32) -> Vec<TimeRange> {
        self.bookings
            .iter()
            .filter(|b| b.room_id == room_id)
            .map(|b| b.range)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

/// Append the cache-busting version parameter to a feed path.
pub fn feed_url(path: &str, version: &str) -> String {
    if version.is_empty() {
        path.to_string()
    } else {
        format!("{}?v={}", path, version)
    }
}

fn convert_ranges(
    raw: BTreeMap<String, Value>,
    kind: ExceptionKind,
) -> BTreeMap<u32, Vec<ExceptionRange>> {
    let mut out = BTreeMap::new();
    for (key, value) in raw {
        let Ok(specialty) = key.trim().parse::<u32>() else {
            warn!(?kind, key = %key, "skipping ranges under a non-numeric specialty key");
            continue;
        };
        let Value::Array(entries) = value else {
            warn!(?kind, specialty, "skipping specialty whose ranges are not an array");
            continue;
        };

        let ranges: Vec<ExceptionRange> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match convert_range(entry) {
                Ok(range) => Some(ExceptionRange { kind, range }),
                Err(e) => {
                    warn!(?kind, specialty, index, error = %e, "skipping malformed range");
                    None
                }
            })
            .collect();
        out.insert(specialty, ranges);
    }
    out
}

fn convert_range(value: Value) -> Result<TimeRange> {
    let raw: RawRange =
        serde_json::from_value(value).map_err(|e| SlotError::FeedFormat(e.to_string()))?;
    parse_range(&raw.start, &raw.end)
}

fn convert_appointment(value: Value) -> Result<BookedInterval> {
    let raw: RawAppointment =
        serde_json::from_value(value).map_err(|e| SlotError::FeedFormat(e.to_string()))?;
    Ok(BookedInterval {
        room_id: raw.room_id,
        range: parse_range(&raw.start, &raw.end)?,
    })
}

fn parse_range(start: &str, end: &str) -> Result<TimeRange> {
    let start: DateTime<Utc> = parse_timestamp(start)?;
    let end: DateTime<Utc> = parse_timestamp(end)?;
    TimeRange::new(start, end)
}
