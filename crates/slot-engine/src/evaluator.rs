//! Per-cell slot evaluation.
//!
//! Given one `(date, time of day)` cell, the specialty's weekday slots, the
//! exception ranges for the specialty, the room's bookings and the current
//! instant, decide whether the cell can be booked. This is the single source of
//! truth for what the calendar shows; the grid only iterates cells and asks.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::feeds::ExceptionRange;
use crate::interval::{any_contains, at_utc, TimeRange};
use crate::recurrence::should_show;
use crate::table::SpecialtySchedule;

/// What a calendar cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// Inside a recurring slot, bookable.
    Available,
    /// Bookable time that already has an appointment.
    Booked,
    /// Inside a blackout with no overriding open exception.
    Blocked,
    /// Opened by an exception range (possibly over a blackout).
    OpenException,
    /// None of the above.
    OutOfRange,
}

impl CellStatus {
    /// Whether a visitor may pick this cell.
    pub fn is_selectable(self) -> bool {
        matches!(self, CellStatus::Available | CellStatus::OpenException)
    }

    /// CSS class the widget's stylesheet uses for this status.
    pub fn css_class(self) -> &'static str {
        match self {
            CellStatus::Available | CellStatus::OpenException => "slot",
            CellStatus::Booked => "booked-slot",
            CellStatus::Blocked | CellStatus::OutOfRange => "disabled-slot",
        }
    }
}

/// Everything the evaluator needs besides the cell itself.
#[derive(Debug, Clone, Copy)]
pub struct SlotContext<'a> {
    /// Weekly availability for the selected location and specialty.
    pub schedule: &'a SpecialtySchedule,
    /// Blackout ranges for the selected specialty.
    pub blackouts: &'a [ExceptionRange],
    /// Open-exception ranges for the selected specialty.
    pub open_exceptions: &'a [ExceptionRange],
    /// Bookings for the room serving this schedule.
    pub booked: &'a [TimeRange],
    /// The current instant; cells before the start of tomorrow are not offered.
    pub now: DateTime<Utc>,
}

/// Midnight UTC at the start of the day after `now`.
///
/// Same-day booking is not offered, so this is the earliest bookable instant.
pub fn start_of_tomorrow(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    at_utc(today, NaiveTime::MIN) + Duration::days(1)
}

/// Evaluate a single cell.
///
/// Precedence, highest first:
///
/// 1. `Booked`: a booking covers the cell and the cell was otherwise
///    bookable (inside an applicable slot, or opened by an exception). A booking
///    over time nobody could book anyway is not flagged.
/// 2. `Available`: inside an applicable slot, not in the past, not blacked out.
/// 3. `OpenException`: an open exception covers the cell. This wins over a
///    blackout for the same instant and is not subject to the past-time check.
/// 4. `Blocked`: a blackout covers the cell.
/// 5. `OutOfRange`: otherwise.
pub fn evaluate(date: NaiveDate, time: NaiveTime, ctx: &SlotContext<'_>) -> CellStatus {
    let instant = at_utc(date, time);

    let within_availability = instant >= start_of_tomorrow(ctx.now)
        && ctx
            .schedule
            .slots_on(date.weekday())
            .iter()
            .any(|slot| slot.covers(time) && should_show(slot, date));

    let is_open = any_contains(ctx.open_exceptions.iter().map(|e| &e.range), instant);
    let is_blocked = any_contains(ctx.blackouts.iter().map(|e| &e.range), instant);
    let is_booked = (within_availability || is_open) && any_contains(ctx.booked, instant);

    if is_booked {
        CellStatus::Booked
    } else if within_availability && !is_blocked {
        CellStatus::Available
    } else if is_open {
        CellStatus::OpenException
    } else if is_blocked {
        CellStatus::Blocked
    } else {
        CellStatus::OutOfRange
    }
}
