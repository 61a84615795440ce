//! Calendar grid generation: week columns, time-of-day rows, navigation
//! cursor, and the view-model handed to whatever draws the calendar.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use serde::Serialize;
use tracing::{debug, warn};

use crate::evaluator::{evaluate, start_of_tomorrow, CellStatus, SlotContext};
use crate::feeds::{Appointments, CalendarRules};
use crate::interval::{at_utc, TimeRange};
use crate::locale::Locale;
use crate::table::AvailabilityTable;

/// Number of columns in the grid: Monday to Friday.
pub const WORKDAYS: usize = 5;

/// The Monday of the ISO week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Monday to Friday starting at `monday`.
pub fn week_days(monday: NaiveDate) -> Vec<NaiveDate> {
    monday.iter_days().take(WORKDAYS).collect()
}

/// Row ticks from `day_start` (inclusive) to `day_end` (exclusive).
///
/// The same ticks are used for every column, so rows line up no matter where
/// each day's slots begin and end. Returns nothing for a zero interval.
pub fn time_ticks(day_start: NaiveTime, day_end: NaiveTime, interval_minutes: u32) -> Vec<NaiveTime> {
    if interval_minutes == 0 {
        return Vec::new();
    }
    let end = day_end.num_seconds_from_midnight() / 60;
    (day_start.num_seconds_from_midnight() / 60..end)
        .step_by(interval_minutes as usize)
        .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
        .collect()
}

/// Row layout for one specialty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub interval_minutes: u32,
}

impl GridSpec {
    pub fn ticks(&self) -> Vec<NaiveTime> {
        time_ticks(self.day_start, self.day_end, self.interval_minutes)
    }
}

/// Which month is displayed and which week is shown inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCursor {
    pub year: i32,
    pub month: u32,
    pub monday: NaiveDate,
}

impl CalendarCursor {
    /// Cursor on the week containing `today`.
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            monday: monday_of(today),
        }
    }

    /// Move by `offset` weeks. The displayed month follows the new Monday.
    pub fn change_week(&mut self, offset: i64) {
        match self.monday.checked_add_signed(Duration::weeks(offset)) {
            Some(monday) => {
                self.monday = monday;
                self.year = monday.year();
                self.month = monday.month();
            }
            None => warn!(offset, "week offset out of range, cursor unchanged"),
        }
    }

    /// Move by `offset` months and show the week of the month's first weekday.
    ///
    /// When the 1st is a Saturday the week of the 3rd is shown; when it is a
    /// Sunday, the week of the 2nd.
    pub fn change_month(&mut self, offset: i32) {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) + offset as i64;
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;

        let Some(first) = i32::try_from(year)
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, 1))
        else {
            warn!(offset, "month offset out of range, cursor unchanged");
            return;
        };

        let first_weekday = match first.weekday() {
            Weekday::Sat => first + Duration::days(2),
            Weekday::Sun => first + Duration::days(1),
            _ => first,
        };

        self.year = first_weekday.year();
        self.month = first_weekday.month();
        self.monday = monday_of(first_weekday);
    }
}

/// One grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub label: String,
    /// Before the first bookable day.
    pub is_past: bool,
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub date: NaiveDate,
    /// `HH:MM`, UTC.
    pub time: String,
    pub status: CellStatus,
    pub selectable: bool,
    pub css_class: &'static str,
    /// Text stored as the selected slot when the cell is picked.
    pub slot_label: String,
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRow {
    pub time: String,
    pub cells: Vec<CellView>,
}

/// Render instructions for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub month_label: String,
    pub location: String,
    pub specialty: u32,
    /// No schedule exists for the selection; the calendar is not shown.
    pub hidden: bool,
    pub days: Vec<DayColumn>,
    pub rows: Vec<TimeRow>,
}

impl CalendarView {
    pub fn cells(&self) -> impl Iterator<Item = &CellView> {
        self.rows.iter().flat_map(|row| row.cells.iter())
    }

    /// The cell at `date` and `time` (`HH:MM`), if it is on the grid.
    pub fn cell(&self, date: NaiveDate, time: &str) -> Option<&CellView> {
        self.cells().find(|c| c.date == date && c.time == time)
    }
}

/// Inputs for rendering one week.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub table: &'a AvailabilityTable,
    pub rules: &'a CalendarRules,
    pub appointments: &'a Appointments,
    pub location: &'a str,
    pub specialty: u32,
    pub cursor: &'a CalendarCursor,
    pub grid: GridSpec,
    pub locale: Locale,
    pub now: DateTime<Utc>,
}

/// Build the view-model for the cursor's week.
///
/// A pure function of its inputs: rendering twice yields equal views.
pub fn render_week(req: &RenderRequest<'_>) -> CalendarView {
    let month_label = req.locale.month_label(req.cursor.year, req.cursor.month);

    let Some(schedule) = req.table.schedule(req.location, req.specialty) else {
        debug!(location = req.location, specialty = req.specialty, "no schedule, calendar hidden");
        return CalendarView {
            month_label,
            location: req.location.to_string(),
            specialty: req.specialty,
            hidden: true,
            days: Vec::new(),
            rows: Vec::new(),
        };
    };

    let dates = week_days(req.cursor.monday);
    let mut booked = schedule
        .room_id
        .map(|room| req.appointments.for_room(room))
        .unwrap_or_default();
    // Only bookings touching the displayed week matter.
    if let (Some(&first), Some(next)) = (dates.first(), dates.last().and_then(|d| d.succ_opt())) {
        let week = TimeRange {
            start: at_utc(first, NaiveTime::MIN),
            end: at_utc(next, NaiveTime::MIN),
        };
        booked.retain(|range| range.overlaps(&week));
    }

    let ctx = SlotContext {
        schedule,
        blackouts: req.rules.blackouts_for(req.specialty),
        open_exceptions: req.rules.open_exceptions_for(req.specialty),
        booked: &booked,
        now: req.now,
    };

    let first_bookable = start_of_tomorrow(req.now);
    let days = dates
        .iter()
        .map(|&date| DayColumn {
            date,
            label: req.locale.day_label(date),
            is_past: at_utc(date, NaiveTime::MIN) < first_bookable,
        })
        .collect();

    let rows = req
        .grid
        .ticks()
        .into_iter()
        .map(|time| {
            let time_label = time.format("%H:%M").to_string();
            let cells = dates
                .iter()
                .map(|&date| {
                    let status = evaluate(date, time, &ctx);
                    CellView {
                        date,
                        time: time_label.clone(),
                        status,
                        selectable: status.is_selectable(),
                        css_class: status.css_class(),
                        slot_label: format!("{} {}", req.locale.date_label(date), time_label),
                        tooltip: tooltip_for(status, req.rules, req.locale),
                    }
                })
                .collect();
            TimeRow {
                time: time_label,
                cells,
            }
        })
        .collect();

    debug!(
        location = req.location,
        specialty = req.specialty,
        monday = %req.cursor.monday,
        bookings = booked.len(),
        "rendered week"
    );

    CalendarView {
        month_label,
        location: req.location.to_string(),
        specialty: req.specialty,
        hidden: false,
        days,
        rows,
    }
}

fn tooltip_for(status: CellStatus, rules: &CalendarRules, locale: Locale) -> Option<String> {
    match status {
        CellStatus::Booked => Some(locale.booked_tooltip().to_string()),
        CellStatus::OpenException => Some(locale.open_exception_tooltip().to_string()),
        CellStatus::Blocked if !rules.holidays_message.is_empty() => {
            Some(rules.holidays_message.clone())
        }
        _ => None,
    }
}
