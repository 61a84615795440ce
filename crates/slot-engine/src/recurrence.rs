//! Recurrence rules for availability slots.
//!
//! Only three kinds exist: every week, every other week counted from an anchor
//! date, and once a month on a fixed day. The anchor is a calendar date, so no
//! timezone can shift which week is the "on" week.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::warn;

use crate::interval::parse_date;

/// How often an availability slot applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every week.
    #[default]
    Weekly,
    /// Every second week, starting with the week of `anchor`.
    Biweekly { anchor: NaiveDate },
    /// Every month, on the given day of the month.
    Monthly { day_of_month: u32 },
}

/// Recurrence used when a slot's `repeat` metadata is absent or unusable.
///
/// A misconfigured slot is shown every week rather than silently disappearing
/// from the calendar.
pub const MISSING_RECURRENCE_FALLBACK: Recurrence = Recurrence::Weekly;

impl Recurrence {
    /// Build a recurrence from the loosely-typed fields of an availability table.
    ///
    /// `repeat` is `"weekly"`, `"biweekly"` or `"monthly"` (absent means weekly).
    /// A biweekly slot needs a parseable `start_date`; a monthly slot needs a
    /// `day_of_month` in `1..=31`. Anything else resolves to
    /// [`MISSING_RECURRENCE_FALLBACK`].
    pub fn from_raw(
        repeat: Option<&str>,
        start_date: Option<&str>,
        day_of_month: Option<u32>,
    ) -> Recurrence {
        match repeat.map(str::trim) {
            None | Some("weekly") => Recurrence::Weekly,
            Some("biweekly") => match start_date.map(parse_date) {
                Some(Ok(anchor)) => Recurrence::Biweekly { anchor },
                Some(Err(e)) => {
                    warn!(error = %e, "biweekly slot has an invalid startDate, falling back");
                    MISSING_RECURRENCE_FALLBACK
                }
                None => {
                    warn!("biweekly slot without startDate, falling back");
                    MISSING_RECURRENCE_FALLBACK
                }
            },
            Some("monthly") => match day_of_month {
                Some(day) if (1..=31).contains(&day) => Recurrence::Monthly { day_of_month: day },
                other => {
                    warn!(day_of_month = ?other, "monthly slot without a valid dayOfMonth, falling back");
                    MISSING_RECURRENCE_FALLBACK
                }
            },
            Some(other) => {
                warn!(repeat = other, "unknown repeat kind, falling back");
                MISSING_RECURRENCE_FALLBACK
            }
        }
    }

    /// Whether a slot with this recurrence applies on `candidate`.
    pub fn applies_on(&self, candidate: NaiveDate) -> bool {
        match *self {
            Recurrence::Weekly => true,
            Recurrence::Biweekly { anchor } => {
                candidate >= anchor && weeks_between(anchor, candidate) % 2 == 0
            }
            Recurrence::Monthly { day_of_month } => candidate.day() == day_of_month,
        }
    }
}

/// One bookable window within a weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub recurrence: Recurrence,
}

impl AvailabilitySlot {
    /// `start <= time < end`.
    pub fn covers(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Whether `slot` applies on the week (or day) of `candidate`.
pub fn should_show(slot: &AvailabilitySlot, candidate: NaiveDate) -> bool {
    slot.recurrence.applies_on(candidate)
}

/// Whole weeks from `from` to `to`: calendar-day difference divided by 7,
/// floored. Negative when `to` precedes `from`.
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().div_euclid(7)
}
