//! The static availability table: location → specialty → weekday → slots.
//!
//! The table is hand-authored JSON. Loading is strict about structure (weekday
//! keys, times, `start < end`) and lenient about recurrence metadata, which
//! falls back to
//! [`MISSING_RECURRENCE_FALLBACK`](crate::recurrence::MISSING_RECURRENCE_FALLBACK).

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SlotError};
use crate::interval::parse_time_of_day;
use crate::recurrence::{AvailabilitySlot, Recurrence};

/// The table compiled into the widget.
const CLINIC_AVAILABILITY_JSON: &str = include_str!("../data/clinic_availability.json");

/// Availability for one specialty at one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpecialtySchedule {
    /// Booking-system room ("gabinete") that appointments for this schedule use.
    pub room_id: Option<u32>,
    /// Slots keyed by weekday number, 0 = Sunday … 6 = Saturday.
    pub day_slots: BTreeMap<u8, Vec<AvailabilitySlot>>,
}

impl SpecialtySchedule {
    /// The ordered slots for `weekday` (empty when the day has none).
    pub fn slots_on(&self, weekday: Weekday) -> &[AvailabilitySlot] {
        let key = weekday.num_days_from_sunday() as u8;
        self.day_slots.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Immutable availability table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailabilityTable {
    locations: BTreeMap<String, BTreeMap<u32, SpecialtySchedule>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchedule {
    room: Option<u32>,
    #[serde(default)]
    day_slots: BTreeMap<String, Vec<RawSlot>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlot {
    start: String,
    end: String,
    // Recurrence fields stay untyped so a wrong JSON type falls back
    // instead of rejecting the whole table.
    repeat: Option<Value>,
    start_date: Option<Value>,
    day_of_month: Option<Value>,
}

impl AvailabilityTable {
    /// The clinic's built-in table.
    pub fn clinic_default() -> Result<Self> {
        Self::from_json(CLINIC_AVAILABILITY_JSON)
    }

    /// Parse a table from its JSON form.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidTable` for malformed JSON, non-numeric
    /// specialty keys, weekday keys outside `0..=6`, or slots whose end is not
    /// after their start; `SlotError::InvalidTime` for unparseable times.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, RawSchedule>> = serde_json::from_str(json)
            .map_err(|e| SlotError::InvalidTable(e.to_string()))?;

        let mut locations = BTreeMap::new();
        for (location, specialties) in raw {
            let mut schedules = BTreeMap::new();
            for (specialty_key, raw_schedule) in specialties {
                let specialty: u32 = specialty_key.trim().parse().map_err(|_| {
                    SlotError::InvalidTable(format!(
                        "{}: specialty key '{}' is not a number",
                        location, specialty_key
                    ))
                })?;
                schedules.insert(specialty, convert_schedule(&location, specialty, raw_schedule)?);
            }
            locations.insert(location, schedules);
        }

        Ok(Self { locations })
    }

    /// The schedule for a location and specialty, if one is configured.
    pub fn schedule(&self, location: &str, specialty: u32) -> Option<&SpecialtySchedule> {
        self.locations.get(location)?.get(&specialty)
    }

    /// The booking room for a location and specialty.
    pub fn room_for(&self, location: &str, specialty: u32) -> Option<u32> {
        self.schedule(location, specialty)?.room_id
    }

    /// Configured location names, sorted.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    /// Every `(location, specialty, schedule)` entry, sorted by location then specialty.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32, &SpecialtySchedule)> {
        self.locations.iter().flat_map(|(location, schedules)| {
            schedules
                .iter()
                .map(move |(specialty, schedule)| (location.as_str(), *specialty, schedule))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.locations.values().all(BTreeMap::is_empty)
    }
}

fn convert_schedule(location: &str, specialty: u32, raw: RawSchedule) -> Result<SpecialtySchedule> {
    let mut day_slots = BTreeMap::new();
    for (day_key, raw_slots) in raw.day_slots {
        let weekday: u8 = match day_key.trim().parse() {
            Ok(day) if day <= 6 => day,
            _ => {
                return Err(SlotError::InvalidTable(format!(
                    "{}/{}: weekday key '{}' must be 0-6",
                    location, specialty, day_key
                )))
            }
        };

        let mut slots = raw_slots
            .into_iter()
            .map(|raw_slot| convert_slot(location, specialty, raw_slot))
            .collect::<Result<Vec<_>>>()?;
        slots.sort_by_key(|slot| (slot.start, slot.end));
        day_slots.insert(weekday, slots);
    }

    Ok(SpecialtySchedule {
        room_id: raw.room,
        day_slots,
    })
}

fn convert_slot(location: &str, specialty: u32, raw: RawSlot) -> Result<AvailabilitySlot> {
    let start = parse_time_of_day(&raw.start)?;
    let end = parse_time_of_day(&raw.end)?;
    if start >= end {
        return Err(SlotError::InvalidTable(format!(
            "{}/{}: slot {}-{} ends before it starts",
            location, specialty, raw.start, raw.end
        )));
    }

    let repeat = loose_text(raw.repeat);
    let start_date = loose_text(raw.start_date);
    let day_of_month = raw
        .day_of_month
        .and_then(|v| v.as_u64())
        .and_then(|d| u32::try_from(d).ok());
    let recurrence =
        Recurrence::from_raw(repeat.as_deref(), start_date.as_deref(), day_of_month);

    Ok(AvailabilitySlot {
        start,
        end,
        recurrence,
    })
}

/// A recurrence field as text. Non-string values are kept in their JSON form
/// so they fail to parse downstream and take the fallback.
fn loose_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
